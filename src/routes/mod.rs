pub mod admin;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod flash_sales;
pub mod orders;
pub mod products;

use axum::Router;
use crate::state::AppState;

/// Public routes are merged as-is; admin-only routes get `require_admin`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(admin::routes())
        .merge(products::routes(state))
        .merge(coupons::routes(state))
        .merge(cart::routes())
        .merge(checkout::routes())
        .merge(orders::routes())
        .merge(flash_sales::routes(state))
}
