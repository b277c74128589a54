//! Claim-set validation
//!
//! Structural validation checks that the decoded key set equals the
//! configured schema exactly; purpose validation additionally requires the
//! `is_refresh` discriminator to be an explicit boolean with the expected
//! value. The split lets callers tell "malformed token" apart from "right
//! shape, wrong purpose".

use serde_json::Value;
use std::collections::BTreeSet;

use crate::{AuthConfig, RawClaims};

/// Claim fields required by every token
pub const BASE_TOKEN_FIELDS: &[&str] = &["username", "roles", "exp", "is_refresh"];

/// Claim field added when the deployment requires emails in tokens
pub const EMAIL_FIELD: &str = "email";

/// Validates decoded claim sets against the configured schema
#[derive(Debug, Clone)]
pub struct TokenValidator {
    required_fields: BTreeSet<&'static str>,
}

impl TokenValidator {
    /// Create a validator from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut required_fields: BTreeSet<&'static str> =
            BASE_TOKEN_FIELDS.iter().copied().collect();
        if config.require_email {
            required_fields.insert(EMAIL_FIELD);
        }
        Self { required_fields }
    }

    /// True iff the claim key set equals the required schema exactly
    ///
    /// No partial matches: a superset or subset of the schema is invalid.
    pub fn validate_structure(&self, claims: &RawClaims) -> bool {
        claims.len() == self.required_fields.len()
            && claims
                .keys()
                .all(|key| self.required_fields.contains(key.as_str()))
    }

    /// True iff the structure is valid and `is_refresh` is the boolean `true`
    pub fn validate_is_refresh(&self, claims: &RawClaims) -> bool {
        self.validate_structure(claims)
            && matches!(claims.get("is_refresh"), Some(Value::Bool(true)))
    }

    /// True iff the structure is valid and `is_refresh` is the boolean `false`
    pub fn validate_is_access(&self, claims: &RawClaims) -> bool {
        self.validate_structure(claims)
            && matches!(claims.get("is_refresh"), Some(Value::Bool(false)))
    }
}
