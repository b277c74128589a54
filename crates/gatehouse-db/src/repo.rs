//! Directory traits
//!
//! Define the async user-directory interface consumed by the auth core and
//! the HTTP service.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::UserRow;

/// User directory trait
///
/// Lookup is keyed by username; listings are ordered by username ascending.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// List users ordered by username, with optional limit and offset
    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> DbResult<Vec<UserRow>>;

    /// Total number of users
    async fn count(&self) -> DbResult<i64>;

    /// Number of users holding the admin role
    async fn count_admins(&self) -> DbResult<i64>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Update a user identified by username
    async fn update(&self, username: &str, update: UpdateUser) -> DbResult<UserRow>;

    /// Delete a user identified by username
    async fn delete(&self, username: &str) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Update user input
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub email: String,
    pub username: String,
    pub roles: Vec<String>,
}
