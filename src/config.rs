//! Environment-based configuration.
//!
//! Values come from process environment variables, then a `.env` file
//! (loaded by `main` through dotenvy), then the defaults below.

use std::env;
use std::net::IpAddr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// HS256 secret for admin tokens. Admin routes reject everything when unset.
    pub jwt_secret: Option<String>,
    /// bcrypt hash of the admin password. Admin login is disabled when unset.
    pub admin_password_hash: Option<String>,
    pub cors_origins: Vec<String>,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            jwt_secret: None,
            admin_password_hash: None,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host_str = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let host = match host_str.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => {
                tracing::warn!(host = %host_str, "Invalid HOST, falling back to {}", DEFAULT_HOST);
                defaults.host
            }
        };

        Self {
            host,
            port: env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()).unwrap_or(DEFAULT_PORT),
            jwt_secret: non_empty_var("JWT_SECRET"),
            admin_password_hash: non_empty_var("ADMIN_PASSWORD_HASH"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.cors_origins),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_demo_data),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
