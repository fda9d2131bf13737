use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::dtos::coupon::{
    CouponListQuery, CouponResponse, CouponValidationResponse, CreateCouponRequest,
    UpdateCouponRequest, ValidateCouponRequest,
};
use crate::dtos::product::DEFAULT_PAGE_LIMIT;
use crate::error::AppError;
use crate::middleware::auth::AdminContext;
use crate::models::coupon::{Coupon, DiscountKind};
use crate::pricing::coupons;
use crate::state::AppState;
use crate::store::Store;

const MIN_CODE_LEN: usize = 3;
const MAX_CODE_LEN: usize = 50;

/// Returns the value to store; free-shipping coupons carry none.
fn validate_discount(kind: DiscountKind, value: f64) -> Result<f64, AppError> {
    if kind == DiscountKind::FreeShipping {
        return Ok(0.0);
    }
    if !(value > 0.0) {
        return Err(AppError::validation("Discount value must be greater than 0"));
    }
    if kind == DiscountKind::Percentage && value > 100.0 {
        return Err(AppError::validation("Percentage discount cannot exceed 100%"));
    }
    Ok(value)
}

fn validate_window(from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match (from, until) {
        (Some(from), Some(until)) if from > until => {
            Err(AppError::validation("Coupon must become valid before it expires"))
        }
        _ => Ok(()),
    }
}

fn validate_products(store: &Store, ids: &[i64]) -> Result<(), AppError> {
    match ids.iter().find(|id| store.product(**id).is_none()) {
        Some(missing) => Err(AppError::not_found(format!("Product {missing} not found"))),
        None => Ok(()),
    }
}

// GET /coupons
#[instrument(skip(state))]
pub async fn list_coupons(
    State(state): State<AppState>,
    Query(q): Query<CouponListQuery>,
) -> Result<Json<Vec<CouponResponse>>, AppError> {
    let store = state.store.read().await;
    let coupons = store.coupons(
        q.active_only.unwrap_or(true),
        q.skip.unwrap_or(0),
        q.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    );
    Ok(Json(coupons.into_iter().map(CouponResponse::from).collect()))
}

// GET /coupons/{id}
pub async fn get_coupon(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CouponResponse>, AppError> {
    let store = state.store.read().await;
    let coupon = store.coupon(id).cloned().ok_or_else(|| AppError::not_found("Coupon not found"))?;
    Ok(Json(coupon.into()))
}

// GET /coupons/code/{code}
pub async fn get_coupon_by_code(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CouponResponse>, AppError> {
    let store = state.store.read().await;
    let coupon = store.coupon_by_code(&code)?.clone();
    Ok(Json(coupon.into()))
}

// POST /coupons
#[instrument(skip(state, admin, payload), fields(code = %payload.code))]
pub async fn create_coupon(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Json(payload): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<CouponResponse>), AppError> {
    let code = coupons::normalize_code(&payload.code);
    if code.len() < MIN_CODE_LEN || code.len() > MAX_CODE_LEN {
        return Err(AppError::validation("Coupon code must be 3 to 50 characters"));
    }
    let value = validate_discount(payload.discount_type, payload.discount_value)?;
    if matches!(payload.minimum_purchase, Some(m) if m < 0.0) {
        return Err(AppError::validation("Minimum purchase cannot be negative"));
    }
    if payload.usage_limit == Some(0) {
        return Err(AppError::validation("Usage limit must be at least 1"));
    }
    validate_window(payload.valid_from, payload.valid_until)?;

    let now = state.clock.now();
    let mut store = state.store.write().await;
    validate_products(&store, &payload.applicable_product_ids)?;

    let id = store.next_id();
    let coupon = store.insert_coupon(Coupon {
        id,
        code,
        description: payload.description,
        kind: payload.discount_type,
        value,
        minimum_subtotal: payload.minimum_purchase.filter(|m| *m > 0.0),
        valid_from: payload.valid_from,
        expires: payload.valid_until,
        usage_limit: payload.usage_limit,
        times_used: 0,
        is_active: payload.is_active.unwrap_or(true),
        applicable_product_ids: payload.applicable_product_ids,
        created_at: now,
    })?;
    info!(id, admin = %admin.subject, "Coupon created");

    Ok((StatusCode::CREATED, Json(coupon.into())))
}

// PUT /coupons/{id}
#[instrument(skip(state, payload))]
pub async fn update_coupon(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCouponRequest>,
) -> Result<Json<CouponResponse>, AppError> {
    let mut store = state.store.write().await;
    if let Some(ids) = payload.applicable_product_ids.as_deref() {
        validate_products(&store, ids)?;
    }

    let coupon = store.coupon_mut(id).ok_or_else(|| AppError::not_found("Coupon not found"))?;
    let kind = payload.discount_type.unwrap_or(coupon.kind);
    let value = validate_discount(kind, payload.discount_value.unwrap_or(coupon.value))?;
    if matches!(payload.minimum_purchase, Some(m) if m < 0.0) {
        return Err(AppError::validation("Minimum purchase cannot be negative"));
    }
    if payload.usage_limit == Some(Some(0)) {
        return Err(AppError::validation("Usage limit must be at least 1"));
    }
    let valid_from = payload.valid_from.unwrap_or(coupon.valid_from);
    let expires = payload.valid_until.unwrap_or(coupon.expires);
    validate_window(valid_from, expires)?;

    coupon.kind = kind;
    coupon.value = value;
    coupon.valid_from = valid_from;
    coupon.expires = expires;
    if let Some(description) = payload.description {
        coupon.description = description;
    }
    if let Some(minimum) = payload.minimum_purchase {
        coupon.minimum_subtotal = Some(minimum).filter(|m| *m > 0.0);
    }
    if let Some(limit) = payload.usage_limit {
        coupon.usage_limit = limit;
    }
    if let Some(active) = payload.is_active {
        coupon.is_active = active;
    }
    if let Some(ids) = payload.applicable_product_ids {
        coupon.applicable_product_ids = ids;
    }

    Ok(Json(coupon.clone().into()))
}

// DELETE /coupons/{id}
#[instrument(skip(state))]
pub async fn delete_coupon(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.write().await;
    store.remove_coupon(id).ok_or_else(|| AppError::not_found("Coupon not found"))?;
    info!(id, "Coupon deleted");
    Ok(StatusCode::NO_CONTENT)
}

// POST /coupons/reset-usage
pub async fn reset_coupon_usage(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> StatusCode {
    state.store.write().await.reset_coupon_usage();
    info!(admin = %admin.subject, "Coupon usage counters reset");
    StatusCode::NO_CONTENT
}

// POST /coupons/validate - never consumes a use
#[instrument(skip(state, payload), fields(code = %payload.code))]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCouponRequest>,
) -> Result<Json<CouponValidationResponse>, AppError> {
    let now = state.clock.now();
    let store = state.store.read().await;

    let result = if payload.cart_items.is_empty() {
        let subtotal = payload.subtotal.unwrap_or(0.0);
        if subtotal < 0.0 {
            return Err(AppError::validation("Subtotal cannot be negative"));
        }
        store
            .coupon_by_code(&payload.code)
            .and_then(|coupon| coupons::evaluate_subtotal(coupon, subtotal, now))
    } else {
        let lines: Vec<(i64, i32)> = payload.cart_items.iter().map(|l| (l.product_id, l.quantity)).collect();
        let priced = store.price_items(&lines, now)?;
        store.quote_coupon(&payload.code, &priced, now)
    };

    Ok(Json(result.into()))
}
