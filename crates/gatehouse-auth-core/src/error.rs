//! Auth errors

use gatehouse_types::Role;
use thiserror::Error;

/// Errors turning an encoded token into a claim set
///
/// The three kinds map to different user-facing messages even where the
/// HTTP layer collapses them into the same status code, so they must stay
/// distinguishable here and in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The token's expiry instant has passed
    #[error("the provided token is expired")]
    Expired,

    /// Bad signature, wrong key or algorithm, or malformed encoding
    #[error("the provided token is invalid, or signed with a different key")]
    Invalid,

    /// Missing token, or any failure outside the signature/expiry checks
    #[error("the token is missing or could not be decoded")]
    Unknown,
}

/// Authentication and authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Claim set decoded but its key set does not match the schema
    #[error("the token does not match the expected claim structure")]
    InvalidStructure,

    /// Right shape, wrong `is_refresh` value for the requested operation
    #[error("the token is not valid for this operation")]
    PurposeMismatch,

    /// Wrong username or password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No valid access token presented
    #[error("unauthenticated")]
    Unauthenticated,

    /// Authenticated but lacking a required role
    #[error("forbidden, required role: {0}")]
    Forbidden(Role),

    /// Token names a principal that no longer exists in the directory
    #[error("the token refers to an unknown user")]
    UnknownUser,

    /// Directory failure; never conflated with an invalid token
    #[error("directory error: {0}")]
    Directory(String),

    /// Token encoding failed
    #[error("token encoding failed: {0}")]
    Encode(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Decode(_) | Self::InvalidCredentials | Self::Unauthenticated | Self::UnknownUser => 401,
            Self::InvalidStructure | Self::PurposeMismatch | Self::Forbidden(_) => 403,
            Self::Directory(_) | Self::Encode(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(DecodeError::Expired) => "TOKEN_EXPIRED",
            Self::Decode(DecodeError::Invalid) => "INVALID_TOKEN",
            Self::Decode(DecodeError::Unknown) => "UNKNOWN_TOKEN",
            Self::InvalidStructure => "INVALID_TOKEN_STRUCTURE",
            Self::PurposeMismatch => "WRONG_TOKEN_PURPOSE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::Directory(_) => "DIRECTORY_ERROR",
            Self::Encode(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<gatehouse_db::DbError> for AuthError {
    fn from(err: gatehouse_db::DbError) -> Self {
        tracing::error!("directory error: {}", err);
        Self::Directory(err.to_string())
    }
}
