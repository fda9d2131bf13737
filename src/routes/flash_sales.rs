use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use crate::handlers::flash_sale;
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/flash-sales", post(flash_sale::create_flash_sale))
        .route("/flash-sales/{id}", delete(flash_sale::delete_flash_sale))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/flash-sales", get(flash_sale::list_flash_sales))
        .route("/flash-sales/{id}", get(flash_sale::get_flash_sale))
        .route("/flash-sales/{id}/countdown", get(flash_sale::get_countdown))
        .route("/flash-sales/{id}/countdown/stream", get(flash_sale::stream_countdown))
        .merge(admin)
}
