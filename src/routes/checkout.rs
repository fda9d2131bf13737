use axum::{routing::post, Router};
use crate::handlers::checkout::checkout;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}
