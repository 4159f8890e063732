//! Ledger engine module.
//!
//! This module contains the core balance-mutation logic including:
//! - `LedgerEngine` - Runs deposits, withdrawals and transfers, and answers history queries
//! - `AccountLedger` - Account balances and their atomic mutation primitives
//! - `TransactionRecorder` - Append-only log of completed movements
//! - `Money` - Exact fixed-point amounts
//! - `Request` types - Deposit, Withdrawal, Transfer as parsed from CSV
//! - `Error` types - Operation, request and I/O errors

mod account;
mod config;
mod error;
mod ledger;
mod ledger_engine;
mod money;
mod query;
mod recorder;
mod request;
mod transaction;

pub(crate) use rust_decimal::Decimal;

pub use account::{Account, AccountDirectory, AccountId, OwnerId};
pub use config::EngineConfig;
pub use error::{Error, LedgerError, RequestError};
pub use ledger::{AccountLedger, CommitUnit, LockPolicy};
pub use ledger_engine::{BatchSummary, LedgerEngine, Receipt, TransferReceipt};
pub use money::{Money, MINOR_UNIT_SCALE};
pub use recorder::TransactionRecorder;
pub use request::{Deposit, Request, RequestRecord, RequestType, Transfer, Withdrawal};
pub use transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
