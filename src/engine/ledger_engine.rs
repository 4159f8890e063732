use std::io::{Read, Write};
use std::thread;

use super::account::{Account, AccountDirectory, AccountId, AccountRecord, OwnerId};
use super::config::EngineConfig;
use super::error::{Error, LedgerError, RequestError};
use super::ledger::AccountLedger;
use super::money::Money;
use super::recorder::TransactionRecorder;
use super::request::{Deposit, Request, RequestRecord, Transfer, Withdrawal};
use super::transaction::{Transaction, TransactionKind};

/// Result of a deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction: Transaction,
    pub new_balance: Money,
}

/// Result of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction: Transaction,
    pub from_balance: Money,
    pub to_balance: Money,
}

/// Counts from one `process_requests` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: u64,
    pub skipped: u64,
}

/// The core ledger engine.
///
/// Turns deposit, withdrawal and transfer requests into balance changes plus an
/// immutable transaction record, committed together. Every method takes
/// `&self`, so one engine can be shared between request handlers.
#[derive(Debug, Default)]
pub struct LedgerEngine {
    pub(super) ledger: AccountLedger,
    pub(super) recorder: TransactionRecorder,
    config: EngineConfig,
}

impl LedgerEngine {
    /// Create a new `LedgerEngine` with no accounts and the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        log::trace!("LedgerEngine initialized with {config:?}");
        Self {
            ledger: AccountLedger::new(config.lock_policy),
            recorder: TransactionRecorder::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers an account with a zero balance.
    pub fn open_account(&self, id: AccountId, owner: OwnerId) -> Result<(), LedgerError> {
        self.ledger.open_account(id, owner)
    }

    pub fn balance(&self, account: &AccountId) -> Result<Money, LedgerError> {
        self.with_retry("balance", || self.ledger.get_balance(account))
    }

    /// Consistent view of every account, sorted by id.
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.with_retry("accounts", || self.ledger.snapshot())
    }

    /// Returns the number of accounts in the engine
    pub fn account_count(&self) -> usize {
        self.ledger.account_count()
    }

    /// Returns the number of recorded transactions
    pub fn transaction_count(&self) -> usize {
        self.recorder.len()
    }

    pub fn execute(&self, request: Request) -> Result<(), LedgerError> {
        log::trace!("Executing request: {request}");
        match request {
            Request::Deposit(deposit) => self.handle_deposit(deposit),
            Request::Withdrawal(withdrawal) => self.handle_withdrawal(withdrawal),
            Request::Transfer(transfer) => self.handle_transfer(transfer),
        }
    }

    /// Retries `operation` while it fails with a retryable error, up to the
    /// configured limit.
    fn with_retry<T>(
        &self,
        operation: &str,
        mut attempt: impl FnMut() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.config.max_conflict_retries => {
                    retries += 1;
                    log::debug!(
                        "[{operation}] {err}, retry {retries}/{}",
                        self.config.max_conflict_retries
                    );
                    thread::sleep(self.config.retry_backoff * retries);
                }
                result => return result,
            }
        }
    }

    fn ensure_exists(&self, account: &AccountId) -> Result<(), LedgerError> {
        if self.ledger.exists(account) {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound {
                account: account.clone(),
            })
        }
    }
}

// =============================================================================
// Balance Operations
// =============================================================================

impl LedgerEngine {
    pub fn deposit(
        &self,
        account: &AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<Receipt, LedgerError> {
        log::trace!("[deposit] account={account} amount={amount}");
        self.ensure_exists(account)?;
        let amount = amount.ensure_positive()?;

        let receipt = self.with_retry("deposit", || {
            self.ledger.with_unit(&[account], |unit| {
                let new_balance = unit.apply_delta(account, amount)?;
                let transaction = self.recorder.append(
                    TransactionKind::Deposit,
                    amount,
                    None,
                    Some(account.clone()),
                    description.clone(),
                );
                Ok(Receipt {
                    transaction,
                    new_balance,
                })
            })
        })?;

        log::trace!(
            "[deposit] account={account} amount={amount} -> new_balance={}",
            receipt.new_balance
        );
        Ok(receipt)
    }

    pub fn withdraw(
        &self,
        account: &AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<Receipt, LedgerError> {
        log::trace!("[withdraw] account={account} amount={amount}");
        self.ensure_exists(account)?;
        let amount = amount.ensure_positive()?;
        let debit = amount
            .checked_neg()
            .ok_or_else(|| LedgerError::invalid_amount(amount, "amount out of range"))?;

        let receipt = self.with_retry("withdraw", || {
            self.ledger.with_unit(&[account], |unit| {
                // Checked against the locked balance, not an earlier read.
                let available = unit.balance(account)?;
                if available < amount {
                    return Err(LedgerError::InsufficientFunds {
                        account: account.clone(),
                        available,
                        requested: amount,
                    });
                }
                let new_balance = unit.apply_delta(account, debit)?;
                let transaction = self.recorder.append(
                    TransactionKind::Withdraw,
                    amount,
                    Some(account.clone()),
                    None,
                    description.clone(),
                );
                Ok(Receipt {
                    transaction,
                    new_balance,
                })
            })
        })?;

        log::trace!(
            "[withdraw] account={account} amount={amount} -> new_balance={}",
            receipt.new_balance
        );
        Ok(receipt)
    }

    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransferReceipt, LedgerError> {
        log::trace!("[transfer] from={from} to={to} amount={amount}");
        if from == to {
            return Err(LedgerError::SameAccount {
                account: from.clone(),
            });
        }
        self.ensure_exists(from)?;
        self.ensure_exists(to)?;
        let amount = amount.ensure_positive()?;

        let receipt = self.with_retry("transfer", || {
            self.ledger.with_unit(&[from, to], |unit| {
                let (from_balance, to_balance) = unit.transfer(from, to, amount)?;
                let transaction = self.recorder.append(
                    TransactionKind::Transfer,
                    amount,
                    Some(from.clone()),
                    Some(to.clone()),
                    description.clone(),
                );
                Ok(TransferReceipt {
                    transaction,
                    from_balance,
                    to_balance,
                })
            })
        })?;

        log::trace!(
            "[transfer] from={from} to={to} amount={amount} -> from_balance={} to_balance={}",
            receipt.from_balance,
            receipt.to_balance
        );
        Ok(receipt)
    }

    fn handle_deposit(&self, deposit: Deposit) -> Result<(), LedgerError> {
        let (account, amount, description) = deposit.into_parts();
        self.deposit(&account, amount, description).map(|_| ())
    }

    fn handle_withdrawal(&self, withdrawal: Withdrawal) -> Result<(), LedgerError> {
        let (account, amount, description) = withdrawal.into_parts();
        self.withdraw(&account, amount, description).map(|_| ())
    }

    fn handle_transfer(&self, transfer: Transfer) -> Result<(), LedgerError> {
        let (from, to, amount, description) = transfer.into_parts();
        self.transfer(&from, &to, amount, description).map(|_| ())
    }
}

// =============================================================================
// Batch CSV Surface
// =============================================================================

impl LedgerEngine {
    /// Registers accounts from `account,owner` CSV rows.
    pub fn load_accounts<R: Read>(&self, reader: R) -> Result<usize, Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut loaded = 0;
        for result in csv_reader.deserialize() {
            let record: AccountRecord = result?;
            self.open_account(record.account, record.owner)?;
            loaded += 1;
        }

        log::info!("Loaded {loaded} accounts");
        Ok(loaded)
    }

    /// Primary batch API: run `type,from,to,amount,description` requests from any source.
    ///
    /// Rows whose columns do not fit their type stop the batch with an error.
    /// Rows the ledger refuses, including amounts that are not a whole number
    /// of minor units, are logged and skipped.
    /// Note that the CSV reader is buffered automatically, so you should not wrap rdr in a buffered reader like `io::BufReader`.
    pub fn process_requests<R: Read>(&self, reader: R) -> Result<BatchSummary, Error> {
        log::info!("Starting request processing");

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut summary = BatchSummary::default();

        for result in csv_reader.deserialize() {
            // Step 1: Parse CSV row into raw RequestRecord
            let record: RequestRecord = result?;

            let row_num = summary.processed + summary.skipped + 1;
            log::trace!("[row {row_num}] Parsing: {record}");

            // Step 2: Convert raw RequestRecord into a well-formed Request,
            // Step 3: and run it against the ledger
            let outcome = match Request::try_from(record) {
                Ok(request) => self.execute(request),
                Err(RequestError::InvalidAmount(e)) => Err(e),
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = outcome {
                log::warn!("[row {row_num}] - Skipped: {e}");
                summary.skipped += 1;
            } else {
                summary.processed += 1;
            }
        }

        log::info!(
            "Processing complete: {} processed, {} skipped, {} transactions recorded",
            summary.processed,
            summary.skipped,
            self.recorder.len()
        );
        Ok(summary)
    }

    /// Write `account,owner,balance` rows, sorted by account, to any sink.
    pub fn export_balances<W: Write>(&self, writer: W) -> Result<(), Error> {
        let accounts = self.accounts()?;
        log::info!("Exporting {} accounts", accounts.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for account in &accounts {
            csv_writer.serialize(account)?;
        }
        csv_writer.flush()?;

        log::trace!("Export complete");
        Ok(())
    }

    /// Write the transaction log, newest first, optionally restricted to `authorized` accounts.
    pub fn export_transactions<W: Write>(
        &self,
        authorized: Option<&[AccountId]>,
        writer: W,
    ) -> Result<(), Error> {
        let transactions = match authorized {
            Some(accounts) => self.list_transactions(accounts),
            None => self.recorder.list_all(),
        };
        log::info!("Exporting {} transactions", transactions.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for transaction in &transactions {
            csv_writer.serialize(transaction)?;
        }
        csv_writer.flush()?;

        log::trace!("Export complete");
        Ok(())
    }
}

impl AccountDirectory for LedgerEngine {
    fn exists(&self, id: &AccountId) -> bool {
        self.ledger.exists(id)
    }

    fn owner_of(&self, id: &AccountId) -> Option<OwnerId> {
        self.ledger.owner_of(id)
    }

    fn accounts_of(&self, owner: &OwnerId) -> Vec<AccountId> {
        self.ledger.accounts_of(owner)
    }
}
