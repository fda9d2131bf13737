use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize)]
pub struct FlashSale {
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// In (0, 100].
    pub discount_percentage: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_quantity: Option<i32>,
    pub sold_quantity: i32,
    pub is_active: bool,
}
