//! User management handlers (register, list, lookup, update, delete)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_auth_core::AuthError;
use gatehouse_db::{CreateUser, UpdateUser, UserDirectory, UserRow};
use gatehouse_types::Role;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::state::AppState;
use crate::validation::{validate_email, validate_password, validate_roles, validate_username};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRolesRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub username: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Partial projection returned to non-admin callers
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full projection returned to admins and for the current user
#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl From<&UserRow> for UserSummary {
    fn from(row: &UserRow) -> Self {
        Self {
            username: row.username.clone(),
            email: row.email.clone(),
            roles: row.roles.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&UserRow> for UserDetails {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username.clone(),
            email: row.email.clone(),
            roles: row.roles.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /user/register
///
/// Self-registration; the role set is fixed to `user`. To choose roles use
/// the admin-gated /user/register-roles endpoint.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = state.auth.hasher().hash(&req.password)?;

    let row = state
        .directory
        .create(CreateUser {
            id: Uuid::new_v4(),
            email: req.email,
            username: req.username,
            password_hash,
            roles: vec![Role::User.to_string()],
        })
        .await?;

    tracing::info!(username = %row.username, "user registered");
    Ok((StatusCode::CREATED, Json(UserSummary::from(&row))))
}

/// POST /user/register-roles
///
/// Registration with an explicit, non-empty role list. Admin only.
pub async fn register_roles(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(req): Json<RegisterRolesRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_roles(&req.roles)?;

    let password_hash = state.auth.hasher().hash(&req.password)?;

    let row = state
        .directory
        .create(CreateUser {
            id: Uuid::new_v4(),
            email: req.email,
            username: req.username,
            password_hash,
            roles: req.roles.iter().map(Role::to_string).collect(),
        })
        .await?;

    tracing::info!(
        username = %row.username,
        roles = ?row.roles,
        by = %admin.claims.username,
        "user registered with explicit roles"
    );
    Ok((StatusCode::CREATED, Json(UserDetails::from(&row))))
}

/// GET /user/all?limit=&skip=
///
/// List users ordered by username. Admins get the full projection, other
/// authenticated users the partial one.
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let rows = state.directory.list(params.limit, params.skip).await?;

    let response = if auth_user.is_admin() {
        Json(rows.iter().map(UserDetails::from).collect::<Vec<_>>()).into_response()
    } else {
        Json(rows.iter().map(UserSummary::from).collect::<Vec<_>>()).into_response()
    };

    Ok(response)
}

/// GET /user/count
pub async fn count_users(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> ApiResult<Json<UserCountResponse>> {
    let count = state.directory.count().await?;

    Ok(Json(UserCountResponse { count }))
}

/// GET /user/username/{username}
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let row = state
        .directory
        .find_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound)?;

    let response = if auth_user.is_admin() {
        Json(UserDetails::from(&row)).into_response()
    } else {
        Json(UserSummary::from(&row)).into_response()
    };

    Ok(response)
}

/// GET /user/me
///
/// Full details of the token's principal. A valid token is not proof the
/// principal still exists, so the directory gets the last word.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserDetails>> {
    let row = state
        .directory
        .find_by_username(&auth_user.claims.username)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    Ok(Json(UserDetails::from(&row)))
}

/// PUT /user/username/{username}
///
/// Admins may update anyone; other users only themselves, and role
/// changes are admin-only.
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserDetails>> {
    if !auth_user.is_admin() && username != auth_user.claims.username {
        return Err(AuthError::Forbidden(Role::Admin).into());
    }

    validate_username(&req.username)?;
    validate_email(&req.email)?;

    let current = state
        .directory
        .find_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound)?;

    let roles = if auth_user.is_admin() {
        validate_roles(&req.roles)?;
        req.roles.iter().map(Role::to_string).collect()
    } else {
        // role changes are admin-only; the stored set is kept
        current.roles.clone()
    };

    let row = state
        .directory
        .update(
            &username,
            UpdateUser {
                email: req.email,
                username: req.username,
                roles,
            },
        )
        .await?;

    tracing::info!(username = %username, updated_to = %row.username, "user updated");
    Ok(Json(UserDetails::from(&row)))
}

/// DELETE /user/username/{username}
///
/// Admins may delete anyone; other users only themselves. Deleting the
/// last admin is refused.
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !auth_user.is_admin() && username != auth_user.claims.username {
        return Err(AuthError::Forbidden(Role::Admin).into());
    }

    let target = state
        .directory
        .find_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound)?;

    if target.roles.iter().any(|role| role == Role::Admin.as_str())
        && state.directory.count_admins().await? == 1
    {
        return Err(ApiError::LastAdmin);
    }

    state.directory.delete(&username).await?;

    tracing::info!(username = %username, "user deleted");
    Ok(Json(MessageResponse { message: "OK" }))
}
