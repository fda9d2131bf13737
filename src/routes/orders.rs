use axum::{routing::get, Router};
use crate::handlers::order;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders/{id}", get(order::get_order))
        .route("/orders/session/{session_id}", get(order::list_session_orders))
        .route("/shipping-methods", get(order::list_shipping_methods))
}
