//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// Unique constraint violated (duplicate username or email)
    #[error("duplicate value for unique field: {0}")]
    Duplicate(String),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicate(db.constraint().unwrap_or("unknown").to_string())
            }
            _ => Self::Sqlx(err),
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
