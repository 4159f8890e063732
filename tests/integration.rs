//! Integration tests for the `LedgerEngine`.
//!
//! These tests exercise the full E2E flow: CSV input → processing → CSV output.
use ledger_engine::{
    Account, AccountDirectory, AccountId, LedgerEngine, LedgerError, Money, Transaction,
    TransactionKind, TransactionStatus,
};
use rust_decimal_macros::dec;
use std::io::Cursor;

const ACCOUNTS: &str = "account,owner
A,alice
B,bob
C,alice";

/// Helper to build an engine with the standard accounts and run a request CSV through it
fn engine_with(input: &str) -> LedgerEngine {
    let engine = LedgerEngine::new();
    engine.load_accounts(Cursor::new(ACCOUNTS)).unwrap();
    engine.process_requests(Cursor::new(input)).unwrap();
    engine
}

/// Helper to run a request CSV through the engine and get the balances output
fn process_csv(input: &str) -> String {
    let engine = engine_with(input);
    let mut output = Vec::new();
    engine.export_balances(&mut output).unwrap();
    String::from_utf8(output).unwrap()
}

/// Parse balances CSV output into accounts
fn parse_output(output: &str) -> Vec<Account> {
    let mut rdr = csv::Reader::from_reader(output.as_bytes());
    rdr.deserialize::<Account>().map(|r| r.unwrap()).collect()
}

/// Parse transaction log CSV output
fn parse_history(output: &[u8]) -> Vec<Transaction> {
    let mut rdr = csv::Reader::from_reader(output);
    rdr.deserialize::<Transaction>().map(|r| r.unwrap()).collect()
}

fn balance_of(accounts: &[Account], id: &str) -> Money {
    accounts
        .iter()
        .find(|a| a.id().as_str() == id)
        .unwrap()
        .balance()
}

fn money(value: rust_decimal::Decimal) -> Money {
    Money::try_from(value).unwrap()
}

#[test]
fn test_basic_deposit() {
    let input = "type,from,to,amount,description
deposit,,A,100000,Salary deposit";

    let engine = engine_with(input);
    let accounts = parse_output(&process_csv(input));

    assert_eq!(accounts.len(), 3);
    assert_eq!(balance_of(&accounts, "A"), money(dec!(100000)));

    let history = engine.account_history(&"A".into()).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), TransactionKind::Deposit);
    assert_eq!(history[0].to(), Some(&AccountId::from("A")));
    assert!(history[0].from().is_none());
    assert_eq!(history[0].description(), Some("Salary deposit"));
}

#[test]
fn test_withdrawal_insufficient_funds_is_skipped() {
    let input = "type,from,to,amount,description
deposit,,A,50000,
withdraw,A,,100000,";

    let engine = engine_with(input);
    let accounts = engine.accounts().unwrap();

    // Withdrawal should be skipped and leave no record
    assert_eq!(balance_of(&accounts, "A"), money(dec!(50000)));
    assert_eq!(engine.transaction_count(), 1);
}

#[test]
fn test_transfer_between_accounts() {
    let input = "type,from,to,amount,description
deposit,,A,1000000,
transfer,A,B,200000,Transfer to friend";

    let engine = engine_with(input);
    let accounts = engine.accounts().unwrap();

    assert_eq!(balance_of(&accounts, "A"), money(dec!(800000)));
    assert_eq!(balance_of(&accounts, "B"), money(dec!(200000)));

    let history = engine.account_history(&"B".into()).unwrap();
    assert_eq!(history.len(), 1);
    let transfer = &history[0];
    assert_eq!(transfer.kind(), TransactionKind::Transfer);
    assert_eq!(transfer.from(), Some(&AccountId::from("A")));
    assert_eq!(transfer.to(), Some(&AccountId::from("B")));
    assert_eq!(transfer.amount(), money(dec!(200000)));
    assert_eq!(transfer.status(), TransactionStatus::Success);
}

#[test]
fn test_transfer_to_same_account_is_skipped() {
    let input = "type,from,to,amount,description
deposit,,A,5000,
transfer,A,A,1000,";

    let engine = engine_with(input);

    assert_eq!(engine.balance(&"A".into()).unwrap(), money(dec!(5000)));
    assert_eq!(engine.transaction_count(), 1);
    assert_eq!(
        engine
            .transfer(&"A".into(), &"A".into(), money(dec!(1000)), None)
            .unwrap_err(),
        LedgerError::SameAccount { account: "A".into() }
    );
}

#[test]
fn test_transfer_to_missing_account_changes_nothing() {
    let input = "type,from,to,amount,description
deposit,,A,5000,
transfer,A,Z,1000,";

    let engine = engine_with(input);

    assert_eq!(engine.balance(&"A".into()).unwrap(), money(dec!(5000)));
    assert_eq!(engine.transaction_count(), 1);
}

#[test]
fn test_non_positive_deposits_are_skipped() {
    let input = "type,from,to,amount,description
deposit,,A,0,
deposit,,A,-5,";

    let engine = engine_with(input);

    assert_eq!(engine.balance(&"A".into()).unwrap(), Money::ZERO);
    assert_eq!(engine.transaction_count(), 0);
}

#[test]
fn test_sub_unit_amounts_are_skipped() {
    let engine = LedgerEngine::new();
    engine.load_accounts(Cursor::new(ACCOUNTS)).unwrap();

    let summary = engine
        .process_requests(Cursor::new(
            "type,from,to,amount,description
deposit,,A,1.005,
deposit,,A,0.0100000000000000001,
deposit,,A,0.010000000000000000000000000000001,
deposit,,A,ten,
deposit,,A,0.01,",
        ))
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 4);
    assert_eq!(engine.balance(&"A".into()).unwrap(), Money::from_minor_units(1));
    assert_eq!(engine.transaction_count(), 1);
}

#[test]
fn test_high_precision_amounts_are_exact() {
    let input = "type,from,to,amount,description
deposit,,A,12345678901234567.89,
transfer,A,B,0.01,";

    let accounts = parse_output(&process_csv(input));

    assert_eq!(
        balance_of(&accounts, "A"),
        Money::from_minor_units(1_234_567_890_123_456_788)
    );
    assert_eq!(balance_of(&accounts, "B"), Money::from_minor_units(1));
}

#[test]
fn test_history_export_keeps_high_precision_amounts() {
    let engine = engine_with(
        "type,from,to,amount,description
deposit,,A,9876543210987654.32,",
    );
    let mut output = Vec::new();
    engine.export_transactions(None, &mut output).unwrap();

    let text = String::from_utf8(output.clone()).unwrap();
    assert!(text.contains(",9876543210987654.32,"));
    let history = parse_history(&output);
    assert_eq!(
        history[0].amount(),
        Money::from_minor_units(987_654_321_098_765_432)
    );
}

#[test]
fn test_batch_summary_counts_skips() {
    let engine = LedgerEngine::new();
    engine.load_accounts(Cursor::new(ACCOUNTS)).unwrap();

    let summary = engine
        .process_requests(Cursor::new(
            "type,from,to,amount,description
deposit,,A,100,
withdraw,A,,150,
transfer,A,B,40,
withdraw,Q,,1,",
        ))
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 2);
}

#[test]
fn test_sum_of_balances_is_conserved_by_transfers() {
    let input = "type,from,to,amount,description
deposit,,A,300,
deposit,,B,200,
transfer,A,B,120.50,
transfer,B,C,75.25,
transfer,C,A,10,
transfer,B,A,1000,";

    let accounts = parse_output(&process_csv(input));
    let total = accounts
        .iter()
        .fold(Money::ZERO, |sum, a| sum.checked_add(a.balance()).unwrap());

    assert_eq!(total, money(dec!(500)));
    assert_eq!(balance_of(&accounts, "A"), money(dec!(189.50)));
    assert_eq!(balance_of(&accounts, "B"), money(dec!(245.25)));
    assert_eq!(balance_of(&accounts, "C"), money(dec!(65.25)));
}

#[test]
fn test_balances_output_format() {
    let input = "type,from,to,amount,description
deposit,,B,12.5,";

    let output = process_csv(input);

    assert_eq!(output, "account,owner,balance\nA,alice,0.00\nB,bob,12.50\nC,alice,0.00\n");
}

#[test]
fn test_history_export_is_newest_first_and_filtered() {
    let input = "type,from,to,amount,description
deposit,,A,100,first
deposit,,B,100,
transfer,A,B,25,second";

    let engine = engine_with(input);
    let alice = engine.accounts_of(&"alice".into());
    assert_eq!(alice, vec![AccountId::from("A"), AccountId::from("C")]);

    let mut output = Vec::new();
    engine
        .export_transactions(Some(alice.as_slice()), &mut output)
        .unwrap();
    let history = parse_history(&output);

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].description(), Some("second"));
    assert_eq!(history[1].description(), Some("first"));

    let mut everything = Vec::new();
    engine.export_transactions(None, &mut everything).unwrap();
    assert_eq!(parse_history(&everything).len(), 3);
}

#[test]
fn test_history_records_are_stable() {
    let input = "type,from,to,amount,description
deposit,,A,100,";

    let engine = engine_with(input);
    let before = engine.list_transactions(&["A".into()]);

    engine
        .process_requests(Cursor::new(
            "type,from,to,amount,description\nwithdraw,A,,30,",
        ))
        .unwrap();
    let after = engine.list_transactions(&["A".into()]);

    assert_eq!(after.len(), 2);
    assert_eq!(after[1], before[0]);
    assert_eq!(
        engine.get_transaction(&["A".into()], before[0].id()).unwrap(),
        before[0]
    );
}

#[test]
fn test_whitespace_handling() {
    let input = "type,  from,  to,  amount,  description
deposit,  ,  A,  100.0,  ";

    let accounts = parse_output(&process_csv(input));

    assert_eq!(balance_of(&accounts, "A"), money(dec!(100)));
}

// ============================================================================
// Invalid Input Tests - These should cause errors
// ============================================================================

/// Helper that returns Result to test error cases
fn try_process_csv(input: &str) -> Result<String, Box<dyn std::error::Error>> {
    let engine = LedgerEngine::new();
    engine.load_accounts(Cursor::new(ACCOUNTS))?;
    engine.process_requests(Cursor::new(input))?;

    let mut output = Vec::new();
    engine.export_balances(&mut output)?;
    Ok(String::from_utf8(output)?)
}

#[test]
fn test_rejects_deposit_with_source_account() {
    let input = "type,from,to,amount,description
deposit,B,A,10,";

    assert!(try_process_csv(input).is_err());
}

#[test]
fn test_rejects_transfer_without_destination() {
    let input = "type,from,to,amount,description
transfer,A,,10,";

    assert!(try_process_csv(input).is_err());
}

#[test]
fn test_rejects_unknown_request_type() {
    let input = "type,from,to,amount,description
dispute,,A,10,";

    assert!(try_process_csv(input).is_err());
}

#[test]
fn test_rejects_duplicate_accounts() {
    let engine = LedgerEngine::new();
    let result = engine.load_accounts(Cursor::new("account,owner\nA,alice\nA,bob"));

    assert!(result.is_err());
    assert_eq!(engine.owner_of(&"A".into()), Some("alice".into()));
}

#[test]
fn test_accepts_valid_precision_variants() {
    // All of these should be valid
    let inputs = [
        "type,from,to,amount,description\ndeposit,,A,100,",
        "type,from,to,amount,description\ndeposit,,A,100.0,",
        "type,from,to,amount,description\ndeposit,,A,100.00,",
        "type,from,to,amount,description\ndeposit,,A,100.000,",
        "type,from,to,amount,description\ndeposit,,A,0.01,",
        "type,from,to,amount,description\ndeposit,,A,0.0100000000000000000,",
    ];

    for input in inputs {
        assert!(try_process_csv(input).is_ok(), "Should accept: {input}");
    }
}
