//! PostgreSQL implementations of the directory traits

mod user;

pub use user::PgUserDirectory;
