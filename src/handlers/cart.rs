use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::dtos::cart::{
    AddToCartRequest, CartItemResponse, CartSummaryQuery, CartSummaryResponse, UpdateCartItemRequest,
};
use crate::dtos::coupon::CouponResponse;
use crate::dtos::product::ProductResponse;
use crate::error::AppError;
use crate::models::cart::CartItem;
use crate::pricing::money::round_to_cents;
use crate::state::AppState;
use crate::store::{PricedItem, Store};

fn describe(store: &Store, items: Vec<CartItem>, now: chrono::DateTime<chrono::Utc>) -> Result<(Vec<CartItemResponse>, Vec<PricedItem>), AppError> {
    let lines: Vec<(i64, i32)> = items.iter().map(|i| (i.product_id, i.quantity)).collect();
    let priced = store.price_items(&lines, now)?;
    let responses = items
        .into_iter()
        .zip(priced.iter())
        .map(|(item, p)| CartItemResponse {
            id: item.id,
            session_id: item.session_id,
            quantity: item.quantity,
            unit_price: p.unit_price,
            line_total: p.line_total,
            is_flash_sale: p.flash_sale_id.is_some(),
            product: ProductResponse::from(p.product.clone()),
            created_at: item.created_at.to_rfc3339(),
        })
        .collect();
    Ok((responses, priced))
}

// GET /cart/{session_id}
#[instrument(skip(state))]
pub async fn get_cart(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItemResponse>>, AppError> {
    let now = state.clock.now();
    let store = state.store.read().await;
    let (items, _) = describe(&store, store.cart_items(&session_id), now)?;
    Ok(Json(items))
}

// POST /cart
#[instrument(skip(state, payload), fields(session_id = %payload.session_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>), AppError> {
    if payload.session_id.trim().is_empty() {
        return Err(AppError::validation("Session id required"));
    }
    let now = state.clock.now();
    let mut store = state.store.write().await;
    let item = store.add_to_cart(&payload.session_id, payload.product_id, payload.quantity, now)?;

    let (mut items, _) = describe(&store, vec![item], now)?;
    let item = items.pop().ok_or_else(|| AppError::internal("cart line missing after insert"))?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /cart/items/{id}
#[instrument(skip(state, payload))]
pub async fn update_cart_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartItemResponse>, AppError> {
    let now = state.clock.now();
    let mut store = state.store.write().await;
    let item = store.update_cart_item(id, payload.quantity)?;

    let (mut items, _) = describe(&store, vec![item], now)?;
    let item = items.pop().ok_or_else(|| AppError::internal("cart line missing after update"))?;
    Ok(Json(item))
}

// DELETE /cart/items/{id}
pub async fn remove_cart_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.write().await;
    store.remove_cart_item(id).ok_or_else(|| AppError::not_found("Cart item not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /cart/{session_id}
pub async fn clear_cart(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.write().await;
    store.clear_cart(&session_id);
    Ok(StatusCode::NO_CONTENT)
}

// GET /cart/{session_id}/summary?coupon_code=
// A rejected coupon is reported in `coupon_message`, not as an error.
#[instrument(skip(state))]
pub async fn get_cart_summary(
    Path(session_id): Path<String>,
    Query(q): Query<CartSummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<CartSummaryResponse>, AppError> {
    let now = state.clock.now();
    let store = state.store.read().await;
    let (items, priced) = describe(&store, store.cart_items(&session_id), now)?;

    let subtotal = round_to_cents(priced.iter().map(|p| p.line_total).sum());
    let mut discount_amount = 0.0;
    let mut free_shipping_applied = false;
    let mut applied_coupon = None;
    let mut coupon_message = None;

    if let Some(code) = q.coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
        match store.quote_coupon(code, &priced, now) {
            Ok(quote) => {
                discount_amount = quote.discount_amount;
                free_shipping_applied = quote.free_shipping;
                applied_coupon = store.coupon_by_code(code).ok().cloned().map(CouponResponse::from);
            }
            Err(err) => coupon_message = Some(err.to_string()),
        }
    }

    Ok(Json(CartSummaryResponse {
        items,
        subtotal,
        discount_amount,
        total: round_to_cents((subtotal - discount_amount).max(0.0)),
        free_shipping_applied,
        applied_coupon,
        coupon_message,
    }))
}
