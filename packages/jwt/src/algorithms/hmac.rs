//! HMAC-SHA256 (HS256) signing and verification

use crate::error::{JwtError, JwtResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Sign with HMAC-SHA256 (HS256)
#[inline]
pub(crate) fn sign_hs256(message: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| JwtError::invalid_key_format("Invalid HMAC key"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an HMAC-SHA256 (HS256) signature with constant-time comparison
#[inline]
pub(crate) fn verify_hs256(message: &[u8], signature: &[u8], secret: &[u8]) -> JwtResult<bool> {
    let expected = sign_hs256(message, secret)?;
    Ok(expected.as_slice().ct_eq(signature).into())
}
