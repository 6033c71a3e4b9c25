//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with fingerprinting of identifiers and
//! integration with the standard log crate. Library crates emit `tracing`
//! events which are forwarded here through tracing's `log` feature.

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points used by the token library and the CLI
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging system (should be called once at application startup)
    ///
    /// Configure levels via the `RUST_LOG` environment variable:
    /// - `RUST_LOG=debug` - Enable all debug logs
    /// - `RUST_LOG=info` - Enable info and above
    /// - `RUST_LOG=ledger_jwt=debug,ledger_jwt_cli=info` - Module-specific levels
    ///
    /// Defaults to `warn` when `RUST_LOG` is unset so token output on stdout stays clean.
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
                .format_timestamp_micros()
                .init();

            debug!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Safe to call from every test; later calls are no-ops.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log that signing key material was loaded. Only the path and algorithm are logged.
    pub fn log_key_loaded(path: &Path, algorithm: &str) {
        info!(
            "Loaded {algorithm} signing key from {}",
            path.display()
        );
    }

    /// Log a minted token by fingerprinting the identities it grants
    pub fn log_token_issued(name: &str, identities: &[String], expires_at: Option<i64>) {
        let fingerprints = identities
            .iter()
            .map(|id| Self::secure_hash_key(id))
            .collect::<Vec<_>>()
            .join(",");
        match expires_at {
            Some(exp) => info!("Issued token {name} (identities: [{fingerprints}], exp: {exp})"),
            None => info!("Issued token {name} (identities: [{fingerprints}], no expiry)"),
        }
    }

    /// Log an output artifact written to disk
    pub fn log_artifact_written(kind: &str, path: &Path, entries: usize) {
        info!("Wrote {kind} to {} ({entries} entries)", path.display());
    }

    /// Log a configuration value that is accepted but weak
    pub fn log_config_warning(setting: &str, detail: &str) {
        warn!("Configuration warning: {setting} - {detail}");
    }

    /// Secure logging of cryptographic errors
    ///
    /// Logs error types without exposing sensitive data
    pub fn log_crypto_error(operation: &str, error: &dyn std::error::Error) {
        error!(
            "Cryptographic operation failed: {} (error_type: {})",
            operation,
            std::any::type_name_of_val(error)
        );
    }

    /// Fingerprint an identifier for logging
    ///
    /// Uses SHA-256 and keeps the first 12 hex characters, prefixed with `#`.
    #[must_use]
    pub fn secure_hash_key(key: &str) -> String {
        let hash = Sha256::digest(key.as_bytes());
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}
