//! Token signer bound to loaded key material.

use crate::algorithms::{sign_token, verify_token, DecodedToken};
use crate::claims::Claims;
use crate::error::JwtResult;
use crate::keys::{KeyMaterial, VerifyingKey};
use crate::types::{Algorithm, Header, JwtToken};
use ledger_jwt_common::LoggingTransformer;
use std::path::Path;

/// Signs claims with one key.
///
/// The key is read once and never mutated, so a signer can be shared freely
/// between threads.
#[derive(Debug)]
pub struct TokenSigner {
    key: KeyMaterial,
    header: Header,
}

impl TokenSigner {
    /// Signer for already loaded key material.
    #[must_use]
    pub fn new(key: KeyMaterial) -> Self {
        let header = Header::new(key.algorithm());
        Self { key, header }
    }

    /// Load key material for `algorithm` from `path`.
    ///
    /// # Errors
    /// See [`KeyMaterial::load`].
    pub fn from_file(path: impl AsRef<Path>, algorithm: Algorithm) -> JwtResult<Self> {
        KeyMaterial::load(path, algorithm).map(Self::new)
    }

    /// Algorithm every token from this signer uses.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.header.alg
    }

    /// Header every token from this signer carries.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Sign `claims`.
    ///
    /// # Errors
    /// See [`sign_token`].
    pub fn sign(&self, claims: &Claims) -> JwtResult<JwtToken> {
        sign_token(&self.header, claims, self.algorithm(), &self.key).inspect_err(|e| {
            LoggingTransformer::log_crypto_error("sign ledger API token", e);
        })
    }

    /// Sign `claims` and log the grant under `name`.
    ///
    /// # Errors
    /// See [`sign_token`].
    pub fn sign_named(&self, name: &str, claims: &Claims) -> JwtResult<JwtToken> {
        let token = self.sign(claims)?;
        LoggingTransformer::log_token_issued(name, &claims.identities(), claims.exp);
        Ok(token)
    }

    /// Check a token against this signer's own key.
    ///
    /// # Errors
    /// See [`verify_token`].
    pub fn verify(&self, token: &str) -> JwtResult<DecodedToken> {
        verify_token(token, &self.verifying_key())
    }

    /// Public half (RS256) or shared secret (HS256) for verification.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}
