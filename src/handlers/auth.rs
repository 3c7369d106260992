use axum::{extract::State, Json};

use crate::auth::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.services.auth.register(request).await?;
    Ok(Json(response))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.services.auth.login(request).await?;
    Ok(Json(response))
}
