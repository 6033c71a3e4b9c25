//! Signing and verifying key material
//!
//! Key material is loaded once and held read-only. Secrets are zeroized on
//! drop and neither variant ever appears in `Debug` output or logs.

use crate::algorithms::{hmac, rsa as rsa_alg};
use crate::error::{JwtError, JwtResult};
use crate::types::Algorithm;
use ledger_jwt_common::LoggingTransformer;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// Smallest RSA modulus accepted for RS256, in bits.
pub const MIN_RSA_BITS: usize = 2048;

/// HMAC secrets shorter than this are accepted but reported as weak.
pub const RECOMMENDED_HMAC_SECRET_LEN: usize = 32;

/// Private key material for signing.
pub struct KeyMaterial {
    kind: SigningKind,
}

enum SigningKind {
    Secret(Zeroizing<Vec<u8>>),
    Rsa(Box<RsaPrivateKey>),
}

impl KeyMaterial {
    /// HMAC shared secret for HS256.
    ///
    /// # Errors
    /// `InvalidKeyFormat` when the secret is empty.
    pub fn secret(secret: impl AsRef<[u8]>) -> JwtResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(JwtError::invalid_key_format("HMAC secret must not be empty"));
        }
        if secret.len() < RECOMMENDED_HMAC_SECRET_LEN {
            LoggingTransformer::log_config_warning(
                "HS256 secret",
                &format!(
                    "{} bytes is below the recommended {RECOMMENDED_HMAC_SECRET_LEN}; use only for development",
                    secret.len()
                ),
            );
        }

        Ok(Self {
            kind: SigningKind::Secret(Zeroizing::new(secret.to_vec())),
        })
    }

    /// RSA private key for RS256 from PKCS#8 (`PRIVATE KEY`) or PKCS#1
    /// (`RSA PRIVATE KEY`) PEM.
    ///
    /// # Errors
    /// `InvalidKeyFormat` when the PEM does not hold an RSA private key of at
    /// least [`MIN_RSA_BITS`].
    pub fn rsa_from_pem(pem: &str) -> JwtResult<Self> {
        let pem = pem.trim();
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|pkcs8_err| {
                RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                    JwtError::InvalidKeyFormat(format!(
                        "not an RSA private key PEM (pkcs8: {pkcs8_err}; pkcs1: {pkcs1_err})"
                    ))
                })
            })?;

        let bits = key.size() * 8;
        if bits < MIN_RSA_BITS {
            return Err(JwtError::InvalidKeyFormat(format!(
                "RSA key is {bits} bits, at least {MIN_RSA_BITS} required"
            )));
        }

        Ok(Self {
            kind: SigningKind::Rsa(Box::new(key)),
        })
    }

    /// Read key material for `algorithm` from a file.
    ///
    /// HS256 files hold the secret as plain bytes, with one trailing line
    /// ending removed. RS256 files hold a PEM private key.
    ///
    /// # Errors
    /// `KeyNotFound` when the file cannot be read, otherwise the errors of
    /// [`KeyMaterial::secret`] or [`KeyMaterial::rsa_from_pem`].
    pub fn load(path: impl AsRef<Path>, algorithm: Algorithm) -> JwtResult<Self> {
        let path = path.as_ref();
        let bytes = Zeroizing::new(
            std::fs::read(path).map_err(|e| JwtError::key_not_found(path, &e))?,
        );

        let key = match algorithm {
            Algorithm::Hs256 => Self::secret(strip_line_ending(&bytes))?,
            Algorithm::Rs256 => {
                let pem = std::str::from_utf8(&bytes)
                    .map_err(|_| JwtError::invalid_key_format("RSA key file is not UTF-8 PEM"))?;
                Self::rsa_from_pem(pem)?
            }
        };

        LoggingTransformer::log_key_loaded(path, algorithm.as_str());
        Ok(key)
    }

    /// Algorithm this material signs with.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self.kind {
            SigningKind::Secret(_) => Algorithm::Hs256,
            SigningKind::Rsa(_) => Algorithm::Rs256,
        }
    }

    /// Matching verification key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        match &self.kind {
            SigningKind::Secret(secret) => VerifyingKey {
                kind: VerifyingKind::Secret(secret.clone()),
            },
            SigningKind::Rsa(key) => VerifyingKey {
                kind: VerifyingKind::Rsa(key.to_public_key()),
            },
        }
    }

    /// Signature over `input` with the strategy this material selects.
    pub(crate) fn sign(&self, input: &[u8]) -> JwtResult<Vec<u8>> {
        match &self.kind {
            SigningKind::Secret(secret) => hmac::sign_hs256(input, secret),
            SigningKind::Rsa(key) => rsa_alg::sign_rs256(input, key),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

/// Key material for checking signatures.
#[derive(Clone)]
pub struct VerifyingKey {
    kind: VerifyingKind,
}

#[derive(Clone)]
enum VerifyingKind {
    Secret(Zeroizing<Vec<u8>>),
    Rsa(RsaPublicKey),
}

impl VerifyingKey {
    /// HMAC shared secret for HS256.
    ///
    /// # Errors
    /// `InvalidKeyFormat` when the secret is empty.
    pub fn secret(secret: impl AsRef<[u8]>) -> JwtResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(JwtError::invalid_key_format("HMAC secret must not be empty"));
        }
        Ok(Self {
            kind: VerifyingKind::Secret(Zeroizing::new(secret.to_vec())),
        })
    }

    /// RSA public key from SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
    ///
    /// # Errors
    /// `InvalidKeyFormat` when the PEM does not hold an RSA public key.
    pub fn rsa_public_from_pem(pem: &str) -> JwtResult<Self> {
        let pem = pem.trim();
        let key = RsaPublicKey::from_public_key_pem(pem).or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                JwtError::InvalidKeyFormat(format!(
                    "not an RSA public key PEM (spki: {spki_err}; pkcs1: {pkcs1_err})"
                ))
            })
        })?;

        Ok(Self {
            kind: VerifyingKind::Rsa(key),
        })
    }

    /// Algorithm this key verifies.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self.kind {
            VerifyingKind::Secret(_) => Algorithm::Hs256,
            VerifyingKind::Rsa(_) => Algorithm::Rs256,
        }
    }

    /// Whether `signature` is valid for `input`.
    pub(crate) fn verify(&self, input: &[u8], signature: &[u8]) -> JwtResult<bool> {
        match &self.kind {
            VerifyingKind::Secret(secret) => hmac::verify_hs256(input, signature, secret),
            VerifyingKind::Rsa(key) => Ok(rsa_alg::verify_rs256(input, signature, key)),
        }
    }
}

impl From<&KeyMaterial> for VerifyingKey {
    fn from(key: &KeyMaterial) -> Self {
        key.verifying_key()
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

/// Drop a single trailing `\n` or `\r\n`.
fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}
