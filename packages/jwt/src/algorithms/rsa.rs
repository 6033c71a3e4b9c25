//! RSA-SHA256 (RS256) signing and verification, RSASSA-PKCS1-v1_5

use crate::error::{JwtError, JwtResult};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Sign with RSA-SHA256 (RS256)
///
/// PKCS#1 v1.5 padding is deterministic, so equal inputs give equal signatures.
#[inline]
pub(crate) fn sign_rs256(message: &[u8], private_key: &RsaPrivateKey) -> JwtResult<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign(message)
        .map_err(|e| JwtError::Signing(format!("RS256 signing failed: {e}")))?;
    Ok(signature.to_vec())
}

/// Verify an RSA-SHA256 (RS256) signature
#[inline]
pub(crate) fn verify_rs256(message: &[u8], signature: &[u8], public_key: &RsaPublicKey) -> bool {
    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };

    verifying_key.verify(message, &signature).is_ok()
}
