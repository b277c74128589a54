//! Signed token encoding and decoding
//!
//! Claims travel as a raw JSON object so structural validation can inspect
//! the exact key set; `TokenClaims` is the typed view parsed afterwards.

use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use gatehouse_types::Role;

use crate::{AuthConfig, AuthError, DecodeError};

/// Decoded token payload as a raw JSON object
pub type RawClaims = serde_json::Map<String, Value>;

/// Non-temporal claims carried by every issued token
///
/// Both tokens of a pair embed the same `UserClaims`; `exp` and
/// `is_refresh` are merged in at encode time. Must never carry a plaintext
/// password: anything placed here ends up base64-encoded, not encrypted,
/// inside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<Role>,
}

/// Typed view of a fully decoded claim set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub exp: i64,
    pub is_refresh: bool,
}

impl TokenClaims {
    /// Parse the typed view out of a raw claim map
    pub fn from_raw(raw: &RawClaims) -> Result<Self, AuthError> {
        serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|_| AuthError::InvalidStructure)
    }

    /// The non-temporal claims, e.g. for re-issuing a pair
    pub fn user_claims(&self) -> UserClaims {
        UserClaims {
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// An access/refresh token pair generated together
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived token, `is_refresh = false`
    pub access_token: String,
    /// Longer-lived token used solely to mint a new pair, `is_refresh = true`
    pub refresh_token: String,
}

/// Token codec holding the signing keys derived once from configuration
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        // expiry is enforced exactly, the way issuance computes it
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            header: Header::new(config.algorithm),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Encode a signed token carrying `user` plus `exp = now + ttl` and the
    /// explicit `is_refresh` discriminator.
    pub fn encode(
        &self,
        user: &UserClaims,
        ttl: Duration,
        is_refresh: bool,
    ) -> Result<String, AuthError> {
        let mut claims = match serde_json::to_value(user) {
            Ok(Value::Object(map)) => map,
            _ => return Err(AuthError::Encode("claims are not a JSON object".to_string())),
        };

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Encode(e.to_string()))?;
        let exp = Utc::now() + ttl;

        claims.insert("exp".to_string(), Value::from(exp.timestamp()));
        claims.insert("is_refresh".to_string(), Value::from(is_refresh));

        jsonwebtoken::encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encode(e.to_string()))
    }

    /// Issue an access/refresh pair with the configured TTLs
    pub fn issue_pair(&self, user: &UserClaims) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.encode(user, self.access_ttl, false)?,
            refresh_token: self.encode(user, self.refresh_ttl, true)?,
        })
    }

    /// Decode a token and return the raw claim set
    ///
    /// The three error kinds stay distinguishable: `Expired` when the time
    /// check fails, `Invalid` when the signature or encoding is malformed,
    /// `Unknown` for anything else including an empty token.
    pub fn decode(&self, token: &str) -> Result<RawClaims, DecodeError> {
        if token.trim().is_empty() {
            return Err(DecodeError::Unknown);
        }

        let data = jsonwebtoken::decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("token decode failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => DecodeError::Expired,
                    ErrorKind::InvalidToken
                    | ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => DecodeError::Invalid,
                    _ => DecodeError::Unknown,
                }
            })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::try_new(SECRET).unwrap())
    }

    fn mario() -> UserClaims {
        UserClaims {
            username: "mariorossi".to_string(),
            email: None,
            roles: vec![Role::User],
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = codec();
        let issued_at = Utc::now().timestamp();
        let token = codec
            .encode(&mario(), Duration::from_secs(300), false)
            .unwrap();

        let raw = codec.decode(&token).unwrap();
        let claims = TokenClaims::from_raw(&raw).unwrap();
        assert_eq!(claims.username, "mariorossi");
        assert_eq!(claims.roles, vec![Role::User]);
        assert!(!claims.is_refresh);
        assert!(claims.exp > issued_at);
    }

    #[test]
    fn test_decode_with_different_key_fails_invalid() {
        let token = codec()
            .encode(&mario(), Duration::from_secs(300), false)
            .unwrap();

        let other = TokenCodec::new(
            &AuthConfig::try_new("ffffffffffffffffffffffffffffffff").unwrap(),
        );
        assert_eq!(other.decode(&token), Err(DecodeError::Invalid));
    }

    #[test]
    fn test_decode_with_different_algorithm_fails_invalid() {
        let config = AuthConfig::try_new(SECRET)
            .unwrap()
            .with_algorithm(Algorithm::HS384)
            .unwrap();
        let token = TokenCodec::new(&config)
            .encode(&mario(), Duration::from_secs(300), false)
            .unwrap();

        assert_eq!(codec().decode(&token), Err(DecodeError::Invalid));
    }

    #[test]
    fn test_decode_expired_token() {
        // craft a token whose exp has already elapsed
        let mut claims = RawClaims::new();
        claims.insert("username".to_string(), Value::from("mariorossi"));
        claims.insert("roles".to_string(), Value::from(vec!["user"]));
        claims.insert(
            "exp".to_string(),
            Value::from(Utc::now().timestamp() - 120),
        );
        claims.insert("is_refresh".to_string(), Value::from(false));

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().decode(&token), Err(DecodeError::Expired));
    }

    #[test]
    fn test_decode_garbage_fails_invalid() {
        assert_eq!(codec().decode("not-a-jwt"), Err(DecodeError::Invalid));
    }

    #[test]
    fn test_decode_empty_token_fails_unknown() {
        assert_eq!(codec().decode(""), Err(DecodeError::Unknown));
        assert_eq!(codec().decode("   "), Err(DecodeError::Unknown));
    }

    #[test]
    fn test_tampered_signature_fails_invalid() {
        let codec = codec();
        let mut token = codec
            .encode(&mario(), Duration::from_secs(300), false)
            .unwrap();
        // flip the last signature character
        let last = if token.ends_with('A') { 'B' } else { 'A' };
        token.pop();
        token.push(last);

        assert_eq!(codec.decode(&token), Err(DecodeError::Invalid));
    }

    #[test]
    fn test_reencode_decoded_claims_is_idempotent() {
        let codec = codec();
        let token = codec
            .encode(&mario(), Duration::from_secs(300), true)
            .unwrap();

        let first = TokenClaims::from_raw(&codec.decode(&token).unwrap()).unwrap();
        let again = codec
            .encode(&first.user_claims(), Duration::from_secs(300), true)
            .unwrap();
        let second = TokenClaims::from_raw(&codec.decode(&again).unwrap()).unwrap();

        assert_eq!(first.user_claims(), second.user_claims());
        assert_eq!(first.is_refresh, second.is_refresh);
    }

    #[test]
    fn test_issue_pair_discriminators() {
        let pair = codec().issue_pair(&mario()).unwrap();

        let codec = codec();
        let access = TokenClaims::from_raw(&codec.decode(&pair.access_token).unwrap()).unwrap();
        let refresh = TokenClaims::from_raw(&codec.decode(&pair.refresh_token).unwrap()).unwrap();
        assert!(!access.is_refresh);
        assert!(refresh.is_refresh);
        // identical non-temporal claims, independent expiries
        assert_eq!(access.user_claims(), refresh.user_claims());
        assert!(access.exp < refresh.exp);
    }

    #[test]
    fn test_email_claim_is_omitted_when_absent() {
        let codec = codec();
        let token = codec
            .encode(&mario(), Duration::from_secs(300), false)
            .unwrap();
        let raw = codec.decode(&token).unwrap();
        assert!(!raw.contains_key("email"));

        let with_email = UserClaims {
            email: Some("mario@example.com".to_string()),
            ..mario()
        };
        let token = codec
            .encode(&with_email, Duration::from_secs(300), false)
            .unwrap();
        let raw = codec.decode(&token).unwrap();
        assert_eq!(raw.get("email"), Some(&Value::from("mario@example.com")));
    }
}
