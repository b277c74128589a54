//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use gatehouse_auth_core::{has_roles, AuthError, DecodeError, TokenClaims};
use gatehouse_types::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated principal extracted from a bearer access token
///
/// Extraction fails with 401 unless the request carries a structurally
/// valid, unexpired access token; a refresh token never authenticates a
/// request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: TokenClaims,
}

impl AuthUser {
    /// Check if the principal holds the admin role
    pub fn is_admin(&self) -> bool {
        has_roles(&self.claims.roles, &[Role::Admin])
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_token(parts)?;

        let check = app_state.auth.is_authorized(&token)?;
        if !check.authenticated {
            return Err(AuthError::Unauthenticated.into());
        }

        let claims = TokenClaims::from_raw(&check.claims)?;
        Ok(Self { claims })
    }
}

/// Principal that passed the admin gate
///
/// Extraction fails with 401 when unauthenticated and 403 when
/// authenticated without the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub claims: TokenClaims,
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_token(parts)?;

        let claims = app_state.auth.require_admin(&token)?;
        Ok(Self { claims })
    }
}

/// Extract the bearer token from the Authorization header
///
/// An absent or non-bearer header classifies as an unknown token, which
/// stays distinct from an invalid one in logs.
fn extract_token(parts: &Parts) -> Result<String, ApiError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Err(AuthError::Decode(DecodeError::Unknown).into());
    };

    let auth_str = auth_header.to_str().map_err(|_| {
        ApiError::BadRequest("Invalid Authorization header encoding".to_string())
    })?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Ok(token.to_string()),
        None => Err(AuthError::Decode(DecodeError::Unknown).into()),
    }
}
