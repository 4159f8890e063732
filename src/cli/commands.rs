pub(crate) use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ledger_engine::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "ledger-engine",
    author,
    version,
    about = "A minimal ledger engine for deposits, withdrawals and transfers",
    long_about = None,
    after_help = "OUTPUT:\n    Final balances (or the transaction log with --history) are printed to stdout in CSV format.\n    Use shell redirection to save to a file:\n\n    ledger-engine --accounts accounts.csv requests.csv > balances.csv"
)]
pub struct Args {
    /// Path to the input requests CSV file
    #[arg(
        index = 1,
        value_name = "FILE",
        help = "Input CSV file with columns: type, from, to, amount, description"
    )]
    pub input_file: PathBuf,

    /// Path to the accounts CSV file
    #[arg(
        long,
        value_name = "FILE",
        help = "CSV file with columns: account, owner"
    )]
    pub accounts: PathBuf,

    /// Export the transaction log instead of balances
    #[arg(long)]
    pub history: bool,

    /// Restrict the exported history to accounts controlled by this owner
    #[arg(long, value_name = "ID", requires = "history")]
    pub owner: Option<String>,

    /// Maximum time to wait for an account lock, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub lock_timeout_ms: u64,

    /// Number of times a conflicting operation is retried
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_retries: u32,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_lock_timeout(Duration::from_millis(self.lock_timeout_ms))
            .with_max_conflict_retries(self.max_retries)
    }
}
