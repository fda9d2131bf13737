use axum::{response::{Response, IntoResponse}};
use axum::extract::{Request, State};
use axum::middleware::Next;
use crate::auth::jwt::{verify_token, ADMIN_ROLE};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Clone)]
pub struct AdminContext {
    pub subject: String,
}

/// Guards catalogue mutations. Expects `Authorization: Bearer <token>`.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return AppError::unauthorized("Missing Authorization header").into_response(),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return AppError::unauthorized("Invalid Authorization format").into_response(),
    };

    let secret = match state.config.jwt_secret.as_deref() {
        Some(s) => s,
        None => return AppError::unauthorized("Server auth misconfiguration").into_response(),
    };

    let claims = match verify_token(token, secret) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    if claims.role != ADMIN_ROLE {
        return AppError::forbidden("Admin access required").into_response();
    }

    req.extensions_mut().insert(AdminContext { subject: claims.sub });

    next.run(req).await
}
