use serde::{Deserialize, Serialize};

use crate::dtos::coupon::CouponResponse;
use crate::dtos::product::ProductResponse;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub session_id: String,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CartSummaryQuery {
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: i64,
    pub session_id: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    pub is_flash_sale: bool,
    pub product: ProductResponse,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct CartSummaryResponse {
    pub items: Vec<CartItemResponse>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total: f64,
    /// Checkout will not charge shipping.
    pub free_shipping_applied: bool,
    pub applied_coupon: Option<CouponResponse>,
    /// Why a requested coupon was not applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_message: Option<String>,
}
