use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use crate::handlers::coupon;
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/coupons", post(coupon::create_coupon))
        .route("/coupons/{id}", put(coupon::update_coupon).delete(coupon::delete_coupon))
        .route("/coupons/reset-usage", post(coupon::reset_coupon_usage))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/coupons", get(coupon::list_coupons))
        .route("/coupons/{id}", get(coupon::get_coupon))
        .route("/coupons/code/{code}", get(coupon::get_coupon_by_code))
        .route("/coupons/validate", post(coupon::validate_coupon))
        .merge(admin)
}
