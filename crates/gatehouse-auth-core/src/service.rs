//! Auth service - composes decode, validation and role checks into
//! authorization decisions, plus the login/refresh issuance flows.

use std::collections::HashSet;
use std::sync::Arc;

use gatehouse_db::{UserDirectory, UserRow};
use gatehouse_types::Role;

use crate::{
    AuthConfig, AuthError, PasswordHasher, RawClaims, TokenClaims, TokenCodec, TokenPair,
    TokenValidator, UserClaims,
};

/// Result of an access-token authorization check
#[derive(Debug, Clone)]
pub struct AccessCheck {
    /// True iff the token is a structurally valid access token
    pub authenticated: bool,
    /// The decoded claim set, returned regardless of the outcome
    pub claims: RawClaims,
}

/// Result of an admin authorization check
#[derive(Debug, Clone)]
pub struct AdminCheck {
    /// True iff the token is a structurally valid access token
    pub authenticated: bool,
    /// True iff authenticated and the claims carry the admin role
    pub admin: bool,
    /// The decoded claim set
    pub claims: RawClaims,
}

/// Authentication service
///
/// Stateless per request: every check is a pure function over the token and
/// the immutable configuration. The directory lookup in `login`/`refresh`
/// is the only suspension point and can fail independently of token
/// validity.
pub struct AuthService<D: UserDirectory> {
    config: AuthConfig,
    codec: TokenCodec,
    validator: TokenValidator,
    hasher: PasswordHasher,
    directory: Arc<D>,
}

impl<D: UserDirectory> AuthService<D> {
    /// Create a new auth service
    pub fn new(config: AuthConfig, directory: Arc<D>) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            validator: TokenValidator::new(&config),
            hasher: PasswordHasher::default(),
            directory,
            config,
        }
    }

    /// The token codec
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The claim-set validator
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// The password hasher
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Authenticate a username/password pair and issue a token pair
    ///
    /// Unknown users and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .directory
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.codec.issue_pair(&self.claims_for(&user))
    }

    /// Exchange a refresh token for a fresh pair
    ///
    /// The old pair is not revoked; security relies on the short access
    /// TTL.
    pub async fn refresh(&self, token: &str) -> Result<TokenPair, AuthError> {
        let raw = self.codec.decode(token)?;

        if !self.validator.validate_structure(&raw) {
            return Err(AuthError::InvalidStructure);
        }
        if !self.validator.validate_is_refresh(&raw) {
            return Err(AuthError::PurposeMismatch);
        }

        let claims = TokenClaims::from_raw(&raw)?;

        // a valid token is not proof the principal still exists
        let user = self
            .directory
            .find_by_username(&claims.username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        self.codec.issue_pair(&self.claims_for(&user))
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Check whether a token authorizes a request
    ///
    /// Decode failures propagate as errors; a token that decodes but is not
    /// a valid access token (a refresh token included) yields
    /// `authenticated = false`.
    pub fn is_authorized(&self, token: &str) -> Result<AccessCheck, AuthError> {
        let claims = self.codec.decode(token)?;
        let authenticated = self.validator.validate_is_access(&claims);
        Ok(AccessCheck {
            authenticated,
            claims,
        })
    }

    /// Check whether a token authorizes a request and carries the admin role
    pub fn is_admin(&self, token: &str) -> Result<AdminCheck, AuthError> {
        let AccessCheck {
            authenticated,
            claims,
        } = self.is_authorized(token)?;

        let admin = authenticated
            && claim_roles(&claims)
                .map(|held| has_roles(&held, &[Role::Admin]))
                .unwrap_or(false);

        Ok(AdminCheck {
            authenticated,
            admin,
            claims,
        })
    }

    /// Gate for role-restricted operations
    ///
    /// Fails with `Unauthenticated` when the token is not a valid access
    /// token and `Forbidden` when it lacks the admin role; on success the
    /// typed claims are returned for the caller's use.
    pub fn require_admin(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let check = self.is_admin(token)?;
        if !check.authenticated {
            return Err(AuthError::Unauthenticated);
        }
        if !check.admin {
            return Err(AuthError::Forbidden(Role::Admin));
        }
        TokenClaims::from_raw(&check.claims)
    }

    fn claims_for(&self, user: &UserRow) -> UserClaims {
        UserClaims {
            username: user.username.clone(),
            email: self.config.require_email.then(|| user.email.clone()),
            roles: parse_roles(&user.roles),
        }
    }
}

impl<D: UserDirectory> std::fmt::Debug for AuthService<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// True iff the held and required role sets intersect (OR semantics)
pub fn has_roles(held: &[Role], required: &[Role]) -> bool {
    let held: HashSet<Role> = held.iter().copied().collect();
    required.iter().any(|role| held.contains(role))
}

/// Extract the role list from a raw claim set
///
/// Unknown role strings are dropped rather than granting anything.
fn claim_roles(claims: &RawClaims) -> Option<Vec<Role>> {
    claims.get("roles")?.as_array().map(|roles| {
        roles
            .iter()
            .filter_map(|role| role.as_str().and_then(|s| s.parse().ok()))
            .collect()
    })
}

/// Parse directory role strings, dropping anything unrecognized
fn parse_roles(roles: &[String]) -> Vec<Role> {
    roles
        .iter()
        .filter_map(|role| match role.parse() {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::warn!("ignoring unknown role '{}' from directory", role);
                None
            }
        })
        .collect()
}
