//! Application state

use std::ops::Deref;
use std::sync::Arc;

use gatehouse_auth_core::AuthService;
use gatehouse_db::pg::PgUserDirectory;
use gatehouse_db::DbPool;

use crate::config::Config;

/// Type alias for the auth service with the concrete directory type
pub type AuthServiceImpl = AuthService<PgUserDirectory>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for token issuance and authorization checks
    pub auth: Arc<AuthServiceImpl>,
    /// User directory
    pub directory: Arc<PgUserDirectory>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        auth: AuthServiceImpl,
        directory: Arc<PgUserDirectory>,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            directory,
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
