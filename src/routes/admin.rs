use axum::{routing::post, Router};
use crate::handlers::admin::admin_login;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/login", post(admin_login))
}
