//! Password hashing
//!
//! Wraps the bcrypt primitive: salted adaptive hashing with a fixed cost
//! factor and constant-time verification.

use crate::AuthError;

/// Password hasher with a configurable cost factor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with an explicit cost factor
    ///
    /// Lower costs are only appropriate in tests.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            AuthError::Internal("password hashing failed".to_string())
        })
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// A malformed stored hash verifies as false, it never errors.
    pub fn verify(&self, password: &str, hashed: &str) -> bool {
        bcrypt::verify(password, hashed).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}
