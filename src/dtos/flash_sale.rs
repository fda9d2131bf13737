use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::countdown::TimeRemaining;
use crate::pricing::flash_sales::{FlashSaleStatus, Urgency};

#[derive(Debug, Deserialize)]
pub struct CreateFlashSaleRequest {
    pub product_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub discount_percentage: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FlashSaleResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub title: String,
    pub description: Option<String>,
    pub discount_percentage: f64,
    pub original_price: f64,
    pub flash_price: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_quantity: Option<i32>,
    pub sold_quantity: i32,
    pub status: FlashSaleStatus,
    pub urgency: Urgency,
    pub time_remaining: String,
    /// Reason the sale cannot be bought right now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    pub flash_sale_id: i64,
    pub end_time: DateTime<Utc>,
    #[serde(flatten)]
    pub remaining: TimeRemaining,
}
