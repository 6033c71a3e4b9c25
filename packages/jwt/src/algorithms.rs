//! JWT algorithms
//!
//! `codec` holds the shared encode/concatenate scaffold; `hmac` and `rsa` are
//! the two signature strategies it dispatches to through [`crate::KeyMaterial`].

mod codec;
pub(crate) mod hmac;
pub(crate) mod rsa;
mod utils;

pub use codec::{decode_unverified, sign_token, verify_token, DecodedToken};
