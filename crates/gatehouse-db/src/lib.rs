//! Gatehouse DB - User directory abstractions
//!
//! SQLx-based directory layer for the gatehouse services.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_db::{create_pool, pg::PgUserDirectory, UserDirectory};
//!
//! let pool = create_pool("postgres://localhost/gatehouse").await?;
//! let directory = PgUserDirectory::new(pool);
//!
//! let user = directory.find_by_username("mariorossi").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pool::{create_pool, DbPool};
pub use repo::*;
