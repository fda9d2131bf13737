use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
    /// Waives the order's shipping charge; `value` is unused.
    #[serde(rename = "free_shipping")]
    FreeShipping,
}

/// Catalogue entry. `code` is always stored normalised (trimmed, upper-case).
#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub kind: DiscountKind,
    pub value: f64,
    pub minimum_subtotal: Option<f64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    /// `None` means unlimited.
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub is_active: bool,
    /// Empty means the coupon applies to every product.
    pub applicable_product_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn applies_to(&self, product_id: i64) -> bool {
        self.applicable_product_ids.is_empty() || self.applicable_product_ids.contains(&product_id)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if self.times_used >= limit)
    }
}
