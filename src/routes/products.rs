use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use crate::handlers::product::{
    get_products, get_product, create_product, update_product, delete_product
};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/products", axum::routing::post(create_product))
        .route("/products/{id}", axum::routing::put(update_product).delete(delete_product))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/products", get(get_products))
        .route("/products/{id}", get(get_product))
        .merge(admin)
}
