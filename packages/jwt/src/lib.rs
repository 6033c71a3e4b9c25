//! JSON Web Tokens for ledger API access
//!
//! This crate provides:
//! - A claims builder for the `https://daml.com/ledger-api` custom claim and
//!   user-based (audience/subject/scope) claims
//! - HS256 and RS256 compact token signing
//! - Key material loading from secret or PEM files
//! - Signature verification of minted tokens
//!
//! ```no_run
//! use ledger_jwt::{build_claims, KeyMaterial, TokenSigner};
//!
//! let claims = build_claims(&["Alice::1220ab"], "participant1", "json-api", None, Some(3600))?;
//! let signer = TokenSigner::new(KeyMaterial::secret("development-secret")?);
//! let token = signer.sign(&claims)?;
//! println!("Authorization: Bearer {token}");
//! # Ok::<(), ledger_jwt::JwtError>(())
//! ```

pub mod algorithms;
pub mod claims;
mod error;
pub mod keys;
mod signer;
mod types;

pub use algorithms::{decode_unverified, sign_token, verify_token, DecodedToken};
pub use claims::{
    build_claims, build_claims_at, build_user_claims, build_user_claims_at, participant_audience,
    random_jwt_id, Claims, ClaimsBuilder, LedgerApiClaim, DEFAULT_SCOPE, LEDGER_API_NAMESPACE,
};
pub use error::{JwtError, JwtResult};
pub use keys::{KeyMaterial, VerifyingKey};
pub use signer::TokenSigner;
pub use types::{Algorithm, Header, JwtToken, JWT_TYPE};
