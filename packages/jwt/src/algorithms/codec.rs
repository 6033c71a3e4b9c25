//! Compact JWS encoding shared by both algorithms
//!
//! `sign_token` serializes header and claims, joins them into the signing
//! input and appends the signature of whichever strategy the key selects.
//! Verification walks the same layout backwards.

use super::utils::{base64_url_decode, base64_url_encode, decode_segment, encode_segment};
use crate::claims::Claims;
use crate::error::{JwtError, JwtResult};
use crate::keys::{KeyMaterial, VerifyingKey};
use crate::types::{Algorithm, Header, JwtToken, JWT_TYPE};

/// Header and claims recovered from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Decoded header
    pub header: Header,
    /// Decoded claims
    pub claims: Claims,
}

/// Sign `claims` into a compact token.
///
/// Either the whole token is returned or nothing is.
///
/// # Errors
/// - `InvalidInput` when `header` does not describe `algorithm` or is not a JWT header
/// - `InvalidKeyFormat` when `key` is not material for `algorithm`
/// - `Serialization` when header or claims fail to serialize
/// - `Signing` when the RSA backend refuses the key
pub fn sign_token(
    header: &Header,
    claims: &Claims,
    algorithm: Algorithm,
    key: &KeyMaterial,
) -> JwtResult<JwtToken> {
    if header.alg != algorithm {
        return Err(JwtError::InvalidInput(format!(
            "header alg {} does not match requested algorithm {algorithm}",
            header.alg
        )));
    }
    if header.typ != JWT_TYPE {
        return Err(JwtError::InvalidInput(format!(
            "header typ must be {JWT_TYPE}, got {}",
            header.typ
        )));
    }
    if key.algorithm() != algorithm {
        return Err(JwtError::InvalidKeyFormat(format!(
            "{} key material cannot sign {algorithm}",
            key.algorithm()
        )));
    }

    let header_b64 = encode_segment(header, "header")?;
    let payload_b64 = encode_segment(claims, "claims")?;
    let message = format!("{header_b64}.{payload_b64}");

    let signature = key.sign(message.as_bytes())?;
    let signature_b64 = base64_url_encode(&signature);

    tracing::debug!(
        alg = %algorithm,
        parties = claims.act_as().len(),
        "signed ledger API token"
    );

    Ok(JwtToken::new(format!("{message}.{signature_b64}")))
}

/// Split a compact token into its three segments.
fn split_token(token: &str) -> JwtResult<(&str, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(JwtError::invalid_token(
            "expected three dot-separated segments",
        )),
    }
}

/// Decode header and claims without checking the signature.
///
/// # Errors
/// `InvalidToken` when the token is not three base64url JSON segments.
pub fn decode_unverified(token: &str) -> JwtResult<DecodedToken> {
    let (header_b64, payload_b64, _) = split_token(token)?;
    Ok(DecodedToken {
        header: decode_segment(header_b64, "header")?,
        claims: decode_segment(payload_b64, "payload")?,
    })
}

/// Check the signature over the token's own header and payload segments.
///
/// The header's `alg` must match the key; a token can never pick a weaker
/// check than the key was created for.
///
/// # Errors
/// - `InvalidToken` for malformed tokens
/// - `InvalidKeyFormat` when the header algorithm does not fit `key`
/// - `InvalidSignature` when the signature does not match
pub fn verify_token(token: &str, key: &VerifyingKey) -> JwtResult<DecodedToken> {
    let (header_b64, payload_b64, signature_b64) = split_token(token)?;

    let header: Header = decode_segment(header_b64, "header")?;
    if header.alg != key.algorithm() {
        return Err(JwtError::InvalidKeyFormat(format!(
            "token signed with {} cannot be checked with a {} key",
            header.alg,
            key.algorithm()
        )));
    }

    let signature = base64_url_decode(signature_b64)
        .map_err(|_| JwtError::invalid_token("Invalid signature encoding"))?;
    let message = format!("{header_b64}.{payload_b64}");
    if !key.verify(message.as_bytes(), &signature)? {
        return Err(JwtError::InvalidSignature);
    }

    Ok(DecodedToken {
        header,
        claims: decode_segment(payload_b64, "payload")?,
    })
}
