use std::net::{IpAddr, SocketAddr};

use dotenvy::dotenv;
use storefront_backend::{build_router, seed, store::Store, AppConfig, AppState};
use tokio::net::TcpListener;

/// How many ports past the configured one to try before giving up.
const PORT_ATTEMPTS: u16 = 20;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let config = AppConfig::from_env();
    if config.jwt_secret.is_none() || config.admin_password_hash.is_none() {
        tracing::warn!("JWT_SECRET or ADMIN_PASSWORD_HASH unset, admin routes are disabled");
    }

    let store = if config.seed_demo_data {
        let store = seed::demo_store(chrono::Utc::now());
        tracing::info!("Loaded demo catalogue");
        store
    } else {
        Store::default()
    };

    let Some((listener, addr)) = bind_with_fallback(config.host, config.port).await else {
        tracing::error!(host = %config.host, port = config.port, "No free port to bind");
        return;
    };

    let app = build_router(AppState::new(store, config));
    tracing::info!(%addr, "Storefront listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

async fn bind_with_fallback(host: IpAddr, port: u16) -> Option<(TcpListener, SocketAddr)> {
    for offset in 0..=PORT_ATTEMPTS {
        let addr = SocketAddr::from((host, port.saturating_add(offset)));
        match TcpListener::bind(addr).await {
            Ok(listener) => return Some((listener, addr)),
            Err(e) if offset == 0 => tracing::warn!(%addr, error = %e, "Port in use, trying the next ones"),
            Err(_) => {}
        }
    }
    None
}
