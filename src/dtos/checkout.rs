use serde::{Deserialize, Serialize};

use crate::dtos::coupon::CartLineRequest;
use crate::models::order::Order;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub session_id: Option<String>,
    pub items: Vec<CartLineRequest>,
    pub coupon_code: Option<String>,
    pub shipping_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub shipping_cost: f64,
    pub total: f64,
}

impl From<&Order> for CheckoutResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            subtotal: order.subtotal,
            discount_amount: order.discount_amount,
            shipping_cost: order.shipping_cost,
            total: order.total,
        }
    }
}
