//! PostgreSQL user directory implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::UserRow;
use crate::repo::{CreateUser, UpdateUser, UserDirectory};

/// PostgreSQL user directory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new user directory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, roles, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> DbResult<Vec<UserRow>> {
        // NULL limit/offset are treated by Postgres as if omitted
        let users = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, roles, created_at, updated_at
            FROM users
            ORDER BY username ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_admins(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE 'admin' = ANY(roles)")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, username, password_hash, roles)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, username: &str, update: UpdateUser) -> DbResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $2, username = $3, roles = $4, updated_at = NOW()
            WHERE username = $1
            RETURNING id, email, username, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(&update.email)
        .bind(&update.username)
        .bind(&update.roles)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(crate::error::DbError::NotFound)?;

        Ok(row)
    }

    async fn delete(&self, username: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::DbError::NotFound);
        }

        Ok(())
    }
}
