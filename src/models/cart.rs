use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: i64,
    pub session_id: String,
    pub product_id: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
