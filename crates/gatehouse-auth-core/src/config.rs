//! Configuration types for the auth core

use jsonwebtoken::Algorithm;
use std::time::Duration;

/// Auth core configuration
///
/// Built once at process start and passed by reference into the token
/// codec, validator and auth service constructors.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared signing secret (HMAC family)
    pub secret: String,
    /// Signing algorithm; must match between issuance and verification
    pub algorithm: Algorithm,
    /// Access token time-to-live
    pub access_ttl: Duration,
    /// Refresh token time-to-live
    pub refresh_ttl: Duration,
    /// Whether the claim schema includes the `email` field
    pub require_email: bool,
}

impl AuthConfig {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a config with the default algorithm (HS256) and TTLs
    /// (30 minutes access, 24 hours refresh).
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than 32 bytes.
    pub fn try_new(secret: impl Into<String>) -> Result<Self, AuthConfigError> {
        let secret = secret.into();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(AuthConfigError::SecretTooShort {
                actual: secret.len(),
                minimum: Self::MIN_SECRET_LENGTH,
            });
        }

        Ok(Self {
            secret,
            algorithm: Algorithm::HS256,
            access_ttl: Duration::from_secs(30 * 60),
            refresh_ttl: Duration::from_secs(24 * 60 * 60),
            require_email: false,
        })
    }

    /// Set the signing algorithm
    ///
    /// Only the HMAC family is supported; tokens are signed with the
    /// shared secret.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, AuthConfigError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthConfigError::UnsupportedAlgorithm(format!(
                "{algorithm:?}"
            )));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    /// Set the access token TTL
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Set the refresh token TTL
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// Require the `email` claim in the token schema
    pub fn with_required_email(mut self, require_email: bool) -> Self {
        self.require_email = require_email;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_length", &self.secret.len())
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("require_email", &self.require_email)
            .finish()
    }
}

/// Errors that can occur when building an auth config
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthConfigError {
    #[error("signing secret too short: got {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
