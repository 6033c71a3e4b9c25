//! `ledger-jwt`: mint ledger API tokens from the command line
//!
//! Single tokens are printed to stdout. Batches are minted completely in
//! memory first and only then written as a JSON token file and an executable
//! shell script exporting one `<NAME>_TOKEN` variable per token.

pub mod batch;
pub mod cli;
pub mod config;
pub mod output;

pub use batch::{mint_batch, BatchError};
pub use cli::{parse_parties, Cli, Commands};
pub use config::{BatchFile, KeySource, SigningConfig};

use anyhow::{Context, Result};
use chrono::Utc;
use ledger_jwt::{build_claims, build_user_claims, random_jwt_id};
use std::io::Write;

/// Execute the parsed command, writing user-facing output to `out`.
///
/// # Errors
/// Any configuration, key, minting or output failure, with context.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = SigningConfig::from_cli(&cli)?;

    match cli.command {
        Commands::PartyToken { parties } => {
            let parties = parse_parties(&parties);
            let claims = build_claims(
                parties.as_slice(),
                &config.ledger_id,
                &config.application_id,
                config.issuer.as_deref(),
                config.expiry_seconds,
            )
            .context("Failed to build party claims")?;

            let token = config.signer()?.sign_named("party-token", &claims)?;
            writeln!(out, "{token}")?;
        }
        Commands::UserToken {
            user_id,
            participant_id,
            scope,
            jti,
            random_jti,
        } => {
            let participant_id = participant_id.as_deref().unwrap_or(&config.ledger_id);
            let claims = build_user_claims(
                &user_id,
                participant_id,
                scope.as_deref(),
                config.expiry_seconds,
            )
            .context("Failed to build user claims")?;
            let jti = if random_jti { Some(random_jwt_id()) } else { jti };
            let claims = match jti {
                Some(jti) => claims.with_jwt_id(jti),
                None => claims,
            };

            let token = config.signer()?.sign_named("user-token", &claims)?;
            writeln!(out, "{token}")?;
        }
        Commands::Batch {
            config: batch_path,
            out: json_path,
            script,
            print,
        } => {
            let batch = BatchFile::load(&batch_path)?;
            let config = config.with_batch_overrides(&batch);
            let signer = config.signer()?;

            let now = Utc::now();
            let tokens = mint_batch(&batch, &config, &signer, now)
                .with_context(|| format!("Batch {} was not written", batch_path.display()))?;

            output::write_artifacts(&json_path, &script, &tokens, now)?;

            writeln!(
                out,
                "Minted {} tokens: {} and {}",
                tokens.len(),
                json_path.display(),
                script.display()
            )?;
            if print {
                for line in output::export_lines(&tokens) {
                    writeln!(out, "{line}")?;
                }
            }
        }
    }

    Ok(())
}
