use axum::{extract::State, Json};
use bcrypt::verify;
use tracing::{info, warn};

use crate::auth::jwt::{sign_admin_token, TOKEN_TTL_HOURS};
use crate::dtos::admin::{AdminLoginRequest, LoginResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let (Some(hash), Some(secret)) = (
        state.config.admin_password_hash.as_deref(),
        state.config.jwt_secret.as_deref(),
    ) else {
        return Err(AppError::forbidden("Admin login is disabled"));
    };

    let ok = verify(&payload.password, hash)
        .map_err(|e| AppError::internal(format!("Verify error: {e}")))?;
    if !ok {
        warn!("Rejected admin login");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = sign_admin_token(secret)?;
    info!("Admin token issued");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: (TOKEN_TTL_HOURS * 3600) as usize,
    }))
}
