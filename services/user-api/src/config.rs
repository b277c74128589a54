//! Configuration for the User API service.

use gatehouse_auth_core::AuthConfig;
use jsonwebtoken::Algorithm;
use std::str::FromStr;
use std::time::Duration;

/// User API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Signing secret (minimum 32 bytes, enforced by AuthConfig)
        let secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        // Signing algorithm (HMAC family)
        let algorithm = std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
        let algorithm =
            Algorithm::from_str(&algorithm).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))?;

        // Token TTLs, in minutes (default: 30 minutes access, 1 day refresh)
        let access_minutes: u64 = std::env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_EXPIRATION_MINUTES"))?;

        let refresh_minutes: u64 = std::env::var("REFRESH_TOKEN_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REFRESH_TOKEN_EXPIRATION_MINUTES"))?;

        // Claim schema variant: whether tokens carry the email field
        let require_email = std::env::var("TOKEN_REQUIRE_EMAIL")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TOKEN_REQUIRE_EMAIL"))?;

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Build auth config
        let auth = AuthConfig::try_new(secret)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_algorithm(algorithm)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_access_ttl(Duration::from_secs(access_minutes * 60))
            .with_refresh_ttl(Duration::from_secs(refresh_minutes * 60))
            .with_required_email(require_email);

        Ok(Self {
            http_port,
            database_url,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
