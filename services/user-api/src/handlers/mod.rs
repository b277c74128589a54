//! HTTP handlers

mod auth;
mod health;
mod user;

pub use auth::{login, refresh};
pub use health::{health, ready};
pub use user::{
    count_users, delete_user, get_user, list_users, me, register, register_roles, update_user,
};
