//! Main entry point for the ledger-jwt command line tool

use clap::Parser;
use ledger_jwt_cli::Cli;
use ledger_jwt_common::LoggingTransformer;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    LoggingTransformer::init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    ledger_jwt_cli::run(cli, &mut stdout.lock())
}
