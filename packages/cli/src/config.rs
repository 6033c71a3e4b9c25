//! Signing configuration and batch file loading

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use ledger_jwt::{Algorithm, KeyMaterial, TokenSigner};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Where the signing key comes from
#[derive(Clone)]
pub enum KeySource {
    /// Key file read once at startup
    File(PathBuf),
    /// Inline HS256 secret
    Secret(Zeroizing<String>),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::File(path) => f.debug_tuple("File").field(path).finish(),
            KeySource::Secret(_) => f.write_str("Secret(<redacted>)"),
        }
    }
}

/// Resolved settings for minting tokens
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Signing algorithm
    pub algorithm: Algorithm,
    /// Signing key location
    pub key: KeySource,
    /// Ledger id for party tokens
    pub ledger_id: String,
    /// Application id for party tokens
    pub application_id: String,
    /// Optional issuer
    pub issuer: Option<String>,
    /// Optional token lifetime
    pub expiry_seconds: Option<u64>,
}

impl SigningConfig {
    /// Resolve configuration from parsed arguments (flags already merged with env).
    ///
    /// # Errors
    /// Fails when an inline secret is combined with RS256.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let key = match &cli.secret {
            Some(_) if cli.algorithm != Algorithm::Hs256 => {
                bail!("--secret only applies to HS256; use --key-file for {}", cli.algorithm)
            }
            Some(secret) => KeySource::Secret(Zeroizing::new(secret.clone())),
            None => KeySource::File(cli.key_file.clone()),
        };

        Ok(Self {
            algorithm: cli.algorithm,
            key,
            ledger_id: cli.ledger_id.clone(),
            application_id: cli.application_id.clone(),
            issuer: cli.issuer.clone(),
            expiry_seconds: cli.expiry_seconds,
        })
    }

    /// Apply the optional settings a batch file declares.
    #[must_use]
    pub fn with_batch_overrides(mut self, batch: &BatchFile) -> Self {
        if let Some(ledger_id) = &batch.ledger_id {
            self.ledger_id.clone_from(ledger_id);
        }
        if let Some(application_id) = &batch.application_id {
            self.application_id.clone_from(application_id);
        }
        if batch.issuer.is_some() {
            self.issuer.clone_from(&batch.issuer);
        }
        if batch.expiry_seconds.is_some() {
            self.expiry_seconds = batch.expiry_seconds;
        }
        self
    }

    /// Load the signing key.
    ///
    /// # Errors
    /// Fails when the key file is missing or the key does not parse.
    pub fn signer(&self) -> Result<TokenSigner> {
        match &self.key {
            KeySource::Secret(secret) => {
                let key = KeyMaterial::secret(secret.as_bytes())
                    .context("Invalid HS256 secret")?;
                Ok(TokenSigner::new(key))
            }
            KeySource::File(path) => TokenSigner::from_file(path, self.algorithm)
                .with_context(|| {
                    format!(
                        "Failed to load {} signing key from {}",
                        self.algorithm,
                        path.display()
                    )
                }),
        }
    }
}

/// Batch file: party aliases and the named token sets to mint
///
/// ```json
/// {
///   "application_id": "rwa-json-api",
///   "expiry_seconds": 3600,
///   "parties": { "bank": "Bank::1220ab", "alice": "Alice::1220ab" },
///   "tokens": { "bank": ["bank"], "bank_alice": ["bank", "alice"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchFile {
    /// Overrides `--ledger-id`
    pub ledger_id: Option<String>,
    /// Overrides `--application-id`
    pub application_id: Option<String>,
    /// Overrides `--issuer`
    pub issuer: Option<String>,
    /// Overrides `--expiry-seconds`
    pub expiry_seconds: Option<u64>,
    /// Alias -> party id
    #[serde(default)]
    pub parties: BTreeMap<String, String>,
    /// Token name -> party aliases
    pub tokens: BTreeMap<String, Vec<String>>,
}

impl BatchFile {
    /// Parse a batch file from JSON text.
    ///
    /// # Errors
    /// Fails on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid batch file")
    }

    /// Read and parse a batch file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }
}
