use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    /// Price at time of purchase.
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub session_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub shipping_method: Option<String>,
    pub shipping_cost: f64,
    pub total: f64,
    pub coupon_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingMethod {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub estimated_days: &'static str,
}

pub static SHIPPING_METHODS: [ShippingMethod; 3] = [
    ShippingMethod {
        id: "standard",
        name: "Standard Shipping",
        description: "5-7 business days",
        price: 10.00,
        estimated_days: "5-7 days",
    },
    ShippingMethod {
        id: "express",
        name: "Express Shipping",
        description: "2-3 business days",
        price: 25.00,
        estimated_days: "2-3 days",
    },
    ShippingMethod {
        id: "overnight",
        name: "Overnight Shipping",
        description: "Next business day",
        price: 45.00,
        estimated_days: "1 day",
    },
];

pub fn shipping_method(id: &str) -> Option<&'static ShippingMethod> {
    SHIPPING_METHODS.iter().find(|m| m.id == id)
}
