use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};

use crate::models::coupon::{Coupon, DiscountKind};
use crate::pricing::coupons::{CouponError, CouponQuote};

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountKind,
    /// Ignored for free-shipping coupons.
    #[serde(default)]
    pub discount_value: f64,
    pub minimum_purchase: Option<f64>,
    pub usage_limit: Option<u32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applicable_product_ids: Vec<i64>,
}

/// Partial update. For the nullable fields an explicit `null` clears the
/// value (unlimited uses, no start or end date) while an absent key keeps it.
#[derive(Debug, Deserialize)]
pub struct UpdateCouponRequest {
    pub description: Option<String>,
    pub discount_type: Option<DiscountKind>,
    pub discount_value: Option<f64>,
    pub minimum_purchase: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub usage_limit: Option<Option<u32>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub valid_from: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub valid_until: Option<Option<DateTime<Utc>>>,
    pub applicable_product_ids: Option<Vec<i64>>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CouponListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// Either priced cart lines or a bare subtotal.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    #[serde(default)]
    pub cart_items: Vec<CartLineRequest>,
    pub subtotal: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CouponValidationResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub discount_amount: f64,
    pub free_shipping_applied: bool,
    pub discount_type: Option<DiscountKind>,
    pub discount_value: Option<f64>,
}

impl From<Result<CouponQuote, CouponError>> for CouponValidationResponse {
    fn from(result: Result<CouponQuote, CouponError>) -> Self {
        match result {
            Ok(quote) => Self {
                valid: true,
                message: "Coupon applied successfully".to_string(),
                reason: None,
                discount_amount: quote.discount_amount,
                free_shipping_applied: quote.free_shipping,
                discount_type: Some(quote.kind),
                discount_value: Some(quote.value),
            },
            Err(err) => Self {
                valid: false,
                message: err.to_string(),
                reason: Some(err.reason()),
                discount_amount: 0.0,
                free_shipping_applied: false,
                discount_type: None,
                discount_value: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub discount_type: DiscountKind,
    pub discount_value: f64,
    pub minimum_purchase: f64,
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub applicable_product_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Coupon> for CouponResponse {
    fn from(c: Coupon) -> Self {
        Self {
            id: c.id,
            code: c.code,
            description: c.description,
            discount_type: c.kind,
            discount_value: c.value,
            minimum_purchase: c.minimum_subtotal.unwrap_or(0.0),
            usage_limit: c.usage_limit,
            times_used: c.times_used,
            is_active: c.is_active,
            valid_from: c.valid_from,
            valid_until: c.expires,
            applicable_product_ids: c.applicable_product_ids,
            created_at: c.created_at,
        }
    }
}
