mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Args;
use ledger_engine::{AccountDirectory, LedgerEngine, OwnerId};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Initialize the LedgerEngine
    let engine = LedgerEngine::with_config(args.engine_config());

    // 2. Register the accounts the requests may touch
    log::info!("Loading accounts from {}", args.accounts.display());
    let accounts = std::fs::File::open(&args.accounts)
        .with_context(|| format!("Failed to open accounts file: {}", args.accounts.display()))?;
    engine
        .load_accounts(accounts)
        .context("Failed to load accounts")?;

    // 3. Open and process the requests file
    log::info!("Processing requests from {}", args.input_file.display());
    let file = std::fs::File::open(&args.input_file)
        .with_context(|| format!("Failed to open input file: {}", args.input_file.display()))?;

    engine
        .process_requests(file)
        .context("Failed to process requests")?;

    // 4. Export balances or history to stdout
    if args.history {
        let authorized = args
            .owner
            .as_deref()
            .map(|owner| engine.accounts_of(&OwnerId::from(owner)));
        engine
            .export_transactions(authorized.as_deref(), std::io::stdout())
            .context("Failed to export transactions to stdout")?;
    } else {
        engine
            .export_balances(std::io::stdout())
            .context("Failed to export balances to stdout")?;
    }

    log::info!("Export complete");

    Ok(())
}
