//! Batch minting of named token sets

use crate::config::{BatchFile, SigningConfig};
use crate::output::export_var_name;
use chrono::{DateTime, Utc};
use ledger_jwt::{build_claims_at, JwtError, TokenSigner};
use std::collections::BTreeMap;

/// Batch minting errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The batch declares no tokens
    #[error("Batch file declares no tokens")]
    Empty,
    /// A token set refers to an alias missing from `parties`
    #[error("Token '{token}' refers to unknown party alias '{alias}'")]
    UnknownAlias {
        /// Token being minted
        token: String,
        /// Alias not found
        alias: String,
    },
    /// A token name does not give a usable shell variable
    #[error("Token '{token}' would be exported as '{variable}', which is not a valid shell identifier")]
    InvalidVariable {
        /// Token name
        token: String,
        /// Variable it maps to
        variable: String,
    },
    /// Two token names map to the same shell variable
    #[error("Tokens '{first}' and '{second}' would both be exported as '{variable}'")]
    VariableCollision {
        /// Token seen first, in name order
        first: String,
        /// Token colliding with it
        second: String,
        /// Shared variable
        variable: String,
    },
    /// Claims or signing failed for one token
    #[error("Failed to mint token '{token}'")]
    Mint {
        /// Token being minted
        token: String,
        /// Core failure
        #[source]
        source: JwtError,
    },
}

/// Mint every token in `batch`, sorted by name.
///
/// Token names are checked first: each must map to a distinct, valid shell
/// variable. Nothing is returned unless every token was minted.
///
/// # Errors
/// The first [`BatchError`] hit, in name order.
pub fn mint_batch(
    batch: &BatchFile,
    config: &SigningConfig,
    signer: &TokenSigner,
    now: DateTime<Utc>,
) -> Result<BTreeMap<String, String>, BatchError> {
    if batch.tokens.is_empty() {
        return Err(BatchError::Empty);
    }
    check_export_names(batch)?;

    let mut minted = BTreeMap::new();
    for (name, aliases) in &batch.tokens {
        let parties = resolve_aliases(batch, name, aliases)?;

        let token = build_claims_at(
            parties.as_slice(),
            &config.ledger_id,
            &config.application_id,
            config.issuer.as_deref(),
            config.expiry_seconds,
            now,
        )
        .and_then(|claims| signer.sign_named(name, &claims))
        .map_err(|source| BatchError::Mint {
            token: name.clone(),
            source,
        })?;

        minted.insert(name.clone(), token.into_string());
    }

    Ok(minted)
}

/// Every token must map to its own valid shell variable.
fn check_export_names(batch: &BatchFile) -> Result<(), BatchError> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for name in batch.tokens.keys() {
        let variable = export_var_name(name);
        if variable.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(BatchError::InvalidVariable {
                token: name.clone(),
                variable,
            });
        }
        if let Some(first) = seen.get(&variable) {
            return Err(BatchError::VariableCollision {
                first: (*first).to_string(),
                second: name.clone(),
                variable,
            });
        }
        seen.insert(variable, name);
    }
    Ok(())
}

fn resolve_aliases<'a>(
    batch: &'a BatchFile,
    token: &str,
    aliases: &[String],
) -> Result<Vec<&'a str>, BatchError> {
    aliases
        .iter()
        .map(|alias| {
            batch
                .parties
                .get(alias)
                .map(String::as_str)
                .ok_or_else(|| BatchError::UnknownAlias {
                    token: token.to_string(),
                    alias: alias.clone(),
                })
        })
        .collect()
}
