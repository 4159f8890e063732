use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::account::AccountId;
use super::error::LedgerError;
use super::money::Money;
use super::transaction::{Transaction, TransactionId, TransactionKind};

#[derive(Debug, Default)]
struct Log {
    entries: Vec<Transaction>,
    by_id: HashMap<TransactionId, usize>,
}

/// Append-only store of transaction records.
///
/// Records are kept in append order; reads return clones, newest first.
#[derive(Debug, Default)]
pub struct TransactionRecorder {
    log: RwLock<Log>,
}

impl TransactionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns identity and timestamp, stores the record and returns a copy of it.
    pub fn append(
        &self,
        kind: TransactionKind,
        amount: Money,
        from: Option<AccountId>,
        to: Option<AccountId>,
        description: Option<String>,
    ) -> Transaction {
        let transaction = Transaction::new(kind, amount, from, to, description);
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        let position = log.entries.len();
        log.by_id.insert(transaction.id(), position);
        log.entries.push(transaction.clone());
        log::trace!("[recorder] appended {transaction}");
        transaction
    }

    pub fn get_by_id(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.by_id
            .get(&id)
            .map(|&position| log.entries[position].clone())
            .ok_or(LedgerError::TransactionNotFound { id })
    }

    /// Records where `account` is source or destination, newest first.
    pub fn list_by_account(&self, account: &AccountId) -> Vec<Transaction> {
        self.newest_first(|tx| tx.touches(account))
    }

    /// Records touching any of `accounts`, newest first.
    pub fn list_for_accounts(&self, accounts: &[AccountId]) -> Vec<Transaction> {
        self.newest_first(|tx| accounts.iter().any(|account| tx.touches(account)))
    }

    /// Every record, newest first.
    pub fn list_all(&self) -> Vec<Transaction> {
        self.newest_first(|_| true)
    }

    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn newest_first(&self, keep: impl Fn(&Transaction) -> bool) -> Vec<Transaction> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.entries.iter().rev().filter(|tx| keep(tx)).cloned().collect()
    }
}
