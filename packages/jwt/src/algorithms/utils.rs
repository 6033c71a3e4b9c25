//! Base64url segment helpers (RFC 7515)

use crate::error::{JwtError, JwtResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Base64 URL-safe encoding without padding
#[inline]
pub(crate) fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding
#[inline]
pub(crate) fn base64_url_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Compact JSON of `value`, base64url encoded
pub(crate) fn encode_segment<T: Serialize>(value: &T, what: &str) -> JwtResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| JwtError::Serialization(format!("{what}: {e}")))?;
    Ok(base64_url_encode(&json))
}

/// Parse a base64url JSON segment
pub(crate) fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> JwtResult<T> {
    let bytes = base64_url_decode(segment)
        .map_err(|_| JwtError::InvalidToken(format!("Invalid {what} encoding")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| JwtError::InvalidToken(format!("Invalid {what} JSON: {e}")))
}
