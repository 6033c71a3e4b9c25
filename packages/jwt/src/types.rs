//! JWT type definitions

use crate::error::JwtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token type carried in every header.
pub const JWT_TYPE: &str = "JWT";

/// Signing algorithms supported for ledger API tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC-SHA256 with a shared secret
    #[serde(rename = "HS256")]
    Hs256,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
}

impl Algorithm {
    /// JOSE `alg` name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Rs256 => "RS256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::Hs256),
            "RS256" => Ok(Algorithm::Rs256),
            other => Err(JwtError::InvalidInput(format!(
                "unsupported algorithm '{other}', expected HS256 or RS256"
            ))),
        }
    }
}

/// JWT header structure
///
/// Serializes as `{"alg":...,"typ":"JWT"}` with `alg` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signing algorithm
    pub alg: Algorithm,
    /// Token type
    pub typ: String,
}

impl Header {
    /// Header for the given algorithm
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            typ: JWT_TYPE.to_string(),
        }
    }
}

/// Compact JWT string `header.payload.signature`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JwtToken(String);

impl JwtToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    /// Borrow the compact form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the compact form
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// The `header.payload` prefix the signature covers
    #[must_use]
    pub fn signing_input(&self) -> &str {
        self.0
            .rsplit_once('.')
            .map_or(self.0.as_str(), |(input, _)| input)
    }
}

impl AsRef<str> for JwtToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<JwtToken> for String {
    fn from(token: JwtToken) -> Self {
        token.0
    }
}

impl fmt::Display for JwtToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
