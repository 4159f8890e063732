//! Basic example of using the `LedgerEngine`.
//!
//! Run with: `cargo run --example basic`

use ledger_engine::{AccountId, LedgerEngine, Money};
use std::io::Cursor;

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let accounts = r"account,owner
acc-alice,alice
acc-bob,bob
";

    // Sample requests as CSV
    let requests = r"type,from,to,amount,description
deposit,,acc-alice,1000000,Salary deposit
withdraw,acc-alice,,50000,ATM
transfer,acc-alice,acc-bob,200000,Transfer to friend
withdraw,acc-bob,,999999,Too much
transfer,acc-bob,acc-bob,10,Same account
";

    // Create engine and process requests
    let engine = LedgerEngine::new();
    engine
        .load_accounts(Cursor::new(accounts))
        .expect("Failed to load accounts");
    let summary = engine
        .process_requests(Cursor::new(requests))
        .expect("Failed to process requests");
    println!("{} processed, {} skipped", summary.processed, summary.skipped);

    // The same operations are available directly
    let receipt = engine
        .deposit(&"acc-bob".into(), Money::from_minor_units(150), Some("Refund".into()))
        .expect("Failed to deposit");
    println!("Deposit {} -> new balance {}", receipt.transaction.id(), receipt.new_balance);

    // Export results to stdout
    println!("\n=== Final Balances ===");
    engine
        .export_balances(std::io::stdout())
        .expect("Failed to export balances");

    println!("\n=== Alice's History ===");
    let alice = [AccountId::from("acc-alice")];
    engine
        .export_transactions(Some(alice.as_slice()), std::io::stdout())
        .expect("Failed to export transactions");
}
