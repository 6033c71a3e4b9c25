//! CLI command definitions

use clap::{Parser, Subcommand};
use ledger_jwt::Algorithm;
use std::path::PathBuf;

/// Global options shared by every subcommand
#[derive(Debug, Parser)]
#[command(name = "ledger-jwt")]
#[command(about = "Mint signed JWTs for ledger API access", long_about = None)]
pub struct Cli {
    /// Signing algorithm (hs256 or rs256)
    #[arg(long, global = true, env = "LEDGER_JWT_ALGORITHM", default_value = "rs256")]
    pub algorithm: Algorithm,

    /// Signing key file: PEM private key for RS256, raw secret for HS256
    #[arg(
        long,
        global = true,
        env = "LEDGER_JWT_KEY_FILE",
        default_value = "config/jwt/jwt-sign.key"
    )]
    pub key_file: PathBuf,

    /// HS256 shared secret, used instead of --key-file
    #[arg(long, global = true, env = "LEDGER_JWT_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Ledger id placed in the ledger API claim
    #[arg(long, global = true, env = "LEDGER_JWT_LEDGER_ID", default_value = "participant1")]
    pub ledger_id: String,

    /// Application id placed in the ledger API claim
    #[arg(
        long,
        global = true,
        env = "LEDGER_JWT_APPLICATION_ID",
        default_value = "json-api"
    )]
    pub application_id: String,

    /// Issuer (iss) claim
    #[arg(long, global = true, env = "LEDGER_JWT_ISSUER")]
    pub issuer: Option<String>,

    /// Token lifetime in seconds; without it tokens carry no exp/iat
    #[arg(long, global = true, env = "LEDGER_JWT_EXPIRY_SECONDS")]
    pub expiry_seconds: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Token minting subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Mint one token acting as the given parties
    ///
    /// Example usage:
    ///   ledger-jwt party-token "Bank::1220ab,Alice::1220ab"
    ///   ledger-jwt --algorithm hs256 --secret dev party-token Alice::1220ab
    PartyToken {
        /// Comma-separated party ids
        parties: String,
    },

    /// Mint one user-based token for a participant user
    UserToken {
        /// Ledger user id (sub claim)
        user_id: String,
        /// Participant the token targets (default: --ledger-id)
        #[arg(long)]
        participant_id: Option<String>,
        /// Scope claim (default: daml_ledger_api)
        #[arg(long)]
        scope: Option<String>,
        /// JWT ID (jti) claim
        #[arg(long)]
        jti: Option<String>,
        /// Set a random v4 UUID as JWT ID
        #[arg(long, conflicts_with = "jti")]
        random_jti: bool,
    },

    /// Mint every token declared in a batch file and write the outputs
    ///
    /// All tokens are minted before anything is written; if one fails no
    /// file is touched.
    Batch {
        /// JSON batch file with party aliases and token sets
        #[arg(long)]
        config: PathBuf,
        /// JSON file receiving name -> token
        #[arg(long, default_value = "jwt-tokens.json")]
        out: PathBuf,
        /// Shell script exporting every token as an environment variable
        #[arg(long, default_value = "load_jwt_tokens.sh")]
        script: PathBuf,
        /// Also print the export lines to stdout
        #[arg(long)]
        print: bool,
    },
}

/// Split a comma-separated party list, trimming whitespace and dropping empties.
#[must_use]
pub fn parse_parties(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|party| !party.is_empty())
        .map(String::from)
        .collect()
}
