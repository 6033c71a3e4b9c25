//! Common infrastructure for the ledger JWT crates
//!
//! This crate provides functionality shared by the token library and the CLI:
//! - `env_logger` based structured logging, initialized once per process
//! - Fingerprinting of party and user identifiers so they never hit logs verbatim

pub mod logging;

pub use logging::LoggingTransformer;
