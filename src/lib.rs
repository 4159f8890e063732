//! A minimal ledger engine.
//!
//! Records deposits, withdrawals and transfers between accounts and keeps
//! balances non-negative and consistent when many callers hit the same
//! accounts at once.

mod engine;

pub use engine::{
    Account, AccountDirectory, AccountId, AccountLedger, BatchSummary, CommitUnit, Deposit,
    EngineConfig, Error, LedgerEngine, LedgerError, LockPolicy, Money, OwnerId, Receipt, Request,
    RequestError, RequestRecord, RequestType, Transaction, TransactionId, TransactionKind,
    TransactionRecorder, TransactionStatus, Transfer, TransferReceipt, Withdrawal,
    MINOR_UNIT_SCALE,
};
