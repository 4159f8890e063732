use std::fmt::Display;

use crate::engine::account::AccountId;
use crate::engine::money::Money;
use crate::engine::request::RequestRecord;
use crate::engine::transaction::TransactionId;

/// Top-level error type for the batch and I/O surfaces of the engine.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Request error: {0}")]
    Request(#[from] RequestError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors during `RequestRecord` -> `Request` conversion.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Columns do not fit the request type (hard error, stops a batch).
    #[error("Invalid request: {0}")]
    InvalidRequest(RequestRecord),
    /// Amount is not an exact number of minor units. A batch skips the row.
    #[error("Invalid request amount: {0}")]
    InvalidAmount(LedgerError),
}

/// Errors returned by ledger operations.
///
/// Every failure here leaves balances and the transaction log exactly as they
/// were before the operation started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Transaction {id} not found")]
    TransactionNotFound { id: TransactionId },

    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: &'static str },

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Money,
        requested: Money,
    },

    #[error("Cannot transfer from account {account} to itself")]
    SameAccount { account: AccountId },

    #[error("Access denied to transaction {id}")]
    AccessDenied { id: TransactionId },

    #[error("Account {account} is busy, gave up waiting for exclusive access")]
    Conflict { account: AccountId },

    #[error("Account {account} already exists")]
    AccountExists { account: AccountId },
}

impl LedgerError {
    pub(crate) fn invalid_amount(amount: impl Display, reason: &'static str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
            reason,
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }
}
