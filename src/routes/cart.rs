use axum::{
    routing::{get, post, put},
    Router,
};
use crate::handlers::cart;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", post(cart::add_to_cart))
        .route("/cart/{session_id}", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/{session_id}/summary", get(cart::get_cart_summary))
        .route("/cart/items/{id}", put(cart::update_cart_item).delete(cart::remove_cart_item))
}
