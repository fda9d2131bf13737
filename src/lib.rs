//! Storefront backend: catalogue, coupons, cart, checkout and flash-sale
//! countdowns over an in-memory store.

pub mod auth;
pub mod config;
pub mod countdown;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use config::AppConfig;
pub use state::AppState;

/// Full application: everything under `/api`, CORS for the configured origins.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let api = routes::create_router(&state)
        .route("/", get(|| async { "Storefront API with coupon support" }))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(list)
}

async fn health_check() -> &'static str {
    "OK"
}
