//! Authentication handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: String,
    pub token: String,
}

/// Login endpoint
///
/// The token is the `username::password` pair the admin endpoints expect
/// in `x-token`. Echoing the credential back is a known weakness kept for
/// compatibility with deployed clients (see DESIGN.md).
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .users
        .verify(&req.username, &req.password)
        .ok_or(AppError::InvalidCredentials)?;

    tracing::info!("User '{}' logged in", req.username);

    Ok(Json(LoginResponse {
        username: req.username.clone(),
        role: user.role.clone(),
        token: format!("{}::{}", req.username, req.password),
    }))
}
