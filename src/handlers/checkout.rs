use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument};

use crate::dtos::checkout::{CheckoutRequest, CheckoutResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::OrderDraft;

// POST /checkout
// Stock, coupon and shipping are validated and applied under one write lock.
#[instrument(skip(state, payload), fields(session_id = ?payload.session_id, items = payload.items.len()))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    if payload.items.is_empty() {
        return Err(AppError::validation("Cart must contain at least one item"));
    }

    let draft = OrderDraft {
        session_id: payload.session_id.filter(|s| !s.trim().is_empty()),
        items: payload.items.iter().map(|i| (i.product_id, i.quantity)).collect(),
        coupon_code: payload.coupon_code,
        shipping_method: payload.shipping_method,
    };

    let now = state.clock.now();
    let order = {
        let mut store = state.store.write().await;
        store.place_order(draft, now)
    };

    match order {
        Ok(order) => {
            info!(order_id = %order.id, total = order.total, coupon = ?order.coupon_code, "Order placed");
            Ok((StatusCode::CREATED, Json(CheckoutResponse::from(&order))))
        }
        Err(e) => {
            error!(error = %e, "Checkout failed");
            Err(e)
        }
    }
}
