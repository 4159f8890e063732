//! Read-only access to the transaction log.
//!
//! Callers pass the set of account ids they were already authorized for; the
//! engine only checks membership against that set.

use super::account::{AccountDirectory, AccountId};
use super::error::LedgerError;
use super::ledger_engine::LedgerEngine;
use super::transaction::{Transaction, TransactionId};

impl LedgerEngine {
    /// Transactions touching any of `authorized`, newest first.
    pub fn list_transactions(&self, authorized: &[AccountId]) -> Vec<Transaction> {
        self.recorder.list_for_accounts(authorized)
    }

    /// Full history of one account, newest first.
    pub fn account_history(&self, account: &AccountId) -> Result<Vec<Transaction>, LedgerError> {
        if !self.ledger.exists(account) {
            return Err(LedgerError::AccountNotFound {
                account: account.clone(),
            });
        }
        Ok(self.recorder.list_by_account(account))
    }

    pub fn get_transaction(
        &self,
        authorized: &[AccountId],
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        let transaction = self.recorder.get_by_id(id)?;
        if authorized.iter().any(|account| transaction.touches(account)) {
            Ok(transaction)
        } else {
            Err(LedgerError::AccessDenied { id })
        }
    }
}
