//! Authentication handlers (login, refresh)

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use gatehouse_auth_core::TokenPair;

use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer",
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
///
/// Authenticate a username/password form (resource-owner password style)
/// and return an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = state.auth.login(&req.username, &req.password).await?;

    tracing::info!(username = %req.username, "login succeeded");
    Ok(Json(pair.into()))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new token pair. When the refresh token
/// itself has expired a fresh login is required.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = state.auth.refresh(&req.refresh_token).await?;

    Ok(Json(pair.into()))
}
