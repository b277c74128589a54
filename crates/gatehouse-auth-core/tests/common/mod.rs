//! Shared test fixtures: an in-memory user directory

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use gatehouse_db::{CreateUser, DbError, DbResult, UpdateUser, UserDirectory, UserRow};

/// In-memory user directory for testing, keyed by username
#[derive(Default, Clone)]
pub struct MockDirectory {
    users: Arc<DashMap<String, UserRow>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user directly
    pub fn insert_user(&self, user: UserRow) {
        self.users.insert(user.username.clone(), user);
    }

    /// Seed a user with a bcrypt-hashed password (low cost, tests only)
    pub fn seed_user(&self, username: &str, password: &str, roles: &[&str]) -> UserRow {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password_hash: bcrypt::hash(password, 4).expect("bcrypt hash"),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.insert_user(row.clone());
        row
    }

    /// Remove a user, e.g. to simulate a vanished principal
    pub fn remove_user(&self, username: &str) {
        self.users.remove(username);
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(username).map(|r| r.value().clone()))
    }

    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> DbResult<Vec<UserRow>> {
        let mut users: Vec<UserRow> = self.users.iter().map(|r| r.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let offset = offset.unwrap_or(0).max(0) as usize;
        let users = users.into_iter().skip(offset);
        Ok(match limit {
            Some(limit) => users.take(limit.max(0) as usize).collect(),
            None => users.collect(),
        })
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.users.len() as i64)
    }

    async fn count_admins(&self) -> DbResult<i64> {
        Ok(self
            .users
            .iter()
            .filter(|r| r.value().roles.iter().any(|role| role == "admin"))
            .count() as i64)
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        if self.users.contains_key(&user.username)
            || self.users.iter().any(|r| r.value().email == user.email)
        {
            return Err(DbError::Duplicate("users_username_key".to_string()));
        }

        let row = UserRow {
            id: user.id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.insert_user(row.clone());
        Ok(row)
    }

    async fn update(&self, username: &str, update: UpdateUser) -> DbResult<UserRow> {
        let (_, mut row) = self
            .users
            .remove(username)
            .ok_or(DbError::NotFound)?;

        row.email = update.email;
        row.username = update.username;
        row.roles = update.roles;
        row.updated_at = Utc::now();
        self.insert_user(row.clone());
        Ok(row)
    }

    async fn delete(&self, username: &str) -> DbResult<()> {
        self.users
            .remove(username)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}
