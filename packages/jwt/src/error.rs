//! JWT error types

use std::path::{Path, PathBuf};

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// JWT error types
///
/// Every error is terminal for the operation that raised it: signing is
/// deterministic, so retrying without fixing the cause fails identically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// Bad caller arguments, e.g. an empty party list
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Key file absent or unreadable
    #[error("Key not found at {}: {reason}", .path.display())]
    KeyNotFound {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },
    /// Key material does not parse, is empty, or does not fit the algorithm
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),
    /// Header or claims could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The signature backend refused to sign
    #[error("Signing error: {0}")]
    Signing(String),
    /// Token is not three well-formed base64url JSON segments
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    /// Signature does not match the token contents
    #[error("Invalid JWT signature")]
    InvalidSignature,
}

impl JwtError {
    /// Create an invalid input error
    #[inline]
    #[must_use]
    pub fn invalid_input(msg: &str) -> Self {
        JwtError::InvalidInput(msg.to_string())
    }

    /// Create a key not found error from the failed read
    #[inline]
    #[must_use]
    pub fn key_not_found(path: &Path, err: &std::io::Error) -> Self {
        JwtError::KeyNotFound {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Create an invalid key format error
    #[inline]
    #[must_use]
    pub fn invalid_key_format(msg: &str) -> Self {
        JwtError::InvalidKeyFormat(msg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        JwtError::Serialization(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: &str) -> Self {
        JwtError::Signing(msg.to_string())
    }

    /// Create an invalid token error
    #[inline]
    #[must_use]
    pub fn invalid_token(msg: &str) -> Self {
        JwtError::InvalidToken(msg.to_string())
    }
}
