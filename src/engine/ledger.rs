use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::account::{Account, AccountDirectory, AccountId, OwnerId};
use super::error::LedgerError;
use super::money::Money;

/// Bounds how long a single account lock acquisition may wait.
///
/// A busy lock is retried after `poll_interval`, doubling after every miss up
/// to `max_poll_interval`, until `max_wait` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
    pub max_poll_interval: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(100),
            poll_interval: Duration::from_micros(20),
            max_poll_interval: Duration::from_millis(2),
        }
    }
}

impl LockPolicy {
    fn next_poll_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_poll_interval)
    }
}

#[derive(Debug)]
struct AccountSlot {
    owner: OwnerId,
    balance: Mutex<Money>,
}

/// Accounts to lock, sorted by id.
type Slots = Vec<(AccountId, Arc<AccountSlot>)>;

/// Owns every account balance and the primitives that mutate them.
///
/// All writes go through a [`CommitUnit`]: the touched accounts are locked in
/// ascending id order, deltas are staged against the locked snapshot, and the
/// staged balances are written only if the whole unit succeeds.
#[derive(Debug, Default)]
pub struct AccountLedger {
    accounts: DashMap<AccountId, Arc<AccountSlot>>,
    lock_policy: LockPolicy,
}

impl AccountLedger {
    pub fn new(lock_policy: LockPolicy) -> Self {
        Self {
            accounts: DashMap::new(),
            lock_policy,
        }
    }

    /// Registers a new account with a zero balance.
    pub fn open_account(&self, id: AccountId, owner: OwnerId) -> Result<(), LedgerError> {
        match self.accounts.entry(id) {
            Entry::Occupied(entry) => Err(LedgerError::AccountExists {
                account: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                log::debug!("[ledger] opened account {} for owner {owner}", entry.key());
                entry.insert(Arc::new(AccountSlot {
                    owner,
                    balance: Mutex::new(Money::ZERO),
                }));
                Ok(())
            }
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn get_balance(&self, id: &AccountId) -> Result<Money, LedgerError> {
        self.with_unit(&[id], |unit| unit.balance(id))
    }

    /// Atomically adjusts one balance by a signed delta.
    pub fn apply_delta(&self, id: &AccountId, delta: Money) -> Result<Money, LedgerError> {
        self.with_unit(&[id], |unit| unit.apply_delta(id, delta))
    }

    /// Atomically debits `from` and credits `to`; either both change or neither does.
    pub fn apply_transfer_delta(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Money,
    ) -> Result<(Money, Money), LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount {
                account: from.clone(),
            });
        }
        let amount = amount.ensure_positive()?;
        self.with_unit(&[from, to], |unit| unit.transfer(from, to, amount))
    }

    /// Runs `f` inside a commit unit holding exclusive access to `ids`.
    ///
    /// Staged balances are written only when `f` returns `Ok`.
    pub fn with_unit<T>(
        &self,
        ids: &[&AccountId],
        f: impl FnOnce(&mut CommitUnit<'_>) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let slots = self.resolve(ids)?;
        let mut unit = CommitUnit::acquire(&slots, self.lock_policy)?;
        let output = f(&mut unit)?;
        unit.commit();
        Ok(output)
    }

    /// Consistent copy of every account, sorted by id.
    ///
    /// Every balance is read while all accounts are locked, so the snapshot
    /// never observes half of a transfer.
    pub fn snapshot(&self) -> Result<Vec<Account>, LedgerError> {
        let mut slots: Slots = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let unit = CommitUnit::acquire(&slots, self.lock_policy)?;
        Ok(slots
            .iter()
            .zip(&unit.locked)
            .map(|((id, slot), entry)| Account::new(id.clone(), slot.owner.clone(), entry.staged))
            .collect())
    }

    /// Looks up the slots for `ids`, deduplicated and in lock order.
    fn resolve(&self, ids: &[&AccountId]) -> Result<Slots, LedgerError> {
        let mut slots = Vec::with_capacity(ids.len());
        for &id in ids {
            let slot = self
                .accounts
                .get(id)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or_else(|| LedgerError::AccountNotFound { account: id.clone() })?;
            slots.push((id.clone(), slot));
        }
        slots.sort_by(|a, b| a.0.cmp(&b.0));
        slots.dedup_by(|a, b| a.0 == b.0);
        Ok(slots)
    }
}

impl AccountDirectory for AccountLedger {
    fn exists(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    fn owner_of(&self, id: &AccountId) -> Option<OwnerId> {
        self.accounts.get(id).map(|entry| entry.value().owner.clone())
    }

    fn accounts_of(&self, owner: &OwnerId) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self
            .accounts
            .iter()
            .filter(|entry| &entry.value().owner == owner)
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }
}

struct LockedAccount<'a> {
    id: &'a AccountId,
    guard: MutexGuard<'a, Money>,
    staged: Money,
}

/// Exclusive, all-or-nothing access to a set of account balances.
///
/// Dropping a unit without committing discards every staged change.
pub struct CommitUnit<'a> {
    locked: Vec<LockedAccount<'a>>,
}

impl<'a> CommitUnit<'a> {
    fn acquire(
        slots: &'a [(AccountId, Arc<AccountSlot>)],
        policy: LockPolicy,
    ) -> Result<Self, LedgerError> {
        let mut locked = Vec::with_capacity(slots.len());
        for (id, slot) in slots {
            let guard = lock_with_deadline(id, &slot.balance, policy)?;
            let staged = *guard;
            locked.push(LockedAccount { id, guard, staged });
        }
        Ok(Self { locked })
    }

    /// Balance of a locked account, including changes staged so far.
    pub fn balance(&self, id: &AccountId) -> Result<Money, LedgerError> {
        self.locked
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.staged)
            .ok_or_else(|| LedgerError::AccountNotFound { account: id.clone() })
    }

    /// Stages a signed change to a locked account; refuses to go below zero.
    pub fn apply_delta(&mut self, id: &AccountId, delta: Money) -> Result<Money, LedgerError> {
        let entry = self
            .locked
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| LedgerError::AccountNotFound { account: id.clone() })?;

        let next = entry
            .staged
            .checked_add(delta)
            .ok_or_else(|| LedgerError::invalid_amount(delta, "balance overflow"))?;
        if next.is_negative() {
            return Err(LedgerError::InsufficientFunds {
                account: id.clone(),
                available: entry.staged,
                requested: delta.checked_neg().unwrap_or(delta),
            });
        }

        entry.staged = next;
        Ok(next)
    }

    /// Stages a debit of `from` and a credit of `to` by the same amount.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Money,
    ) -> Result<(Money, Money), LedgerError> {
        let debit = amount
            .checked_neg()
            .ok_or_else(|| LedgerError::invalid_amount(amount, "amount out of range"))?;
        let from_balance = self.apply_delta(from, debit)?;
        let to_balance = self.apply_delta(to, amount)?;
        Ok((from_balance, to_balance))
    }

    fn commit(mut self) {
        for entry in &mut self.locked {
            *entry.guard = entry.staged;
        }
    }
}

fn lock_with_deadline<'a>(
    id: &AccountId,
    balance: &'a Mutex<Money>,
    policy: LockPolicy,
) -> Result<MutexGuard<'a, Money>, LedgerError> {
    let started = Instant::now();
    let mut interval = policy.poll_interval;
    loop {
        match balance.try_lock() {
            Ok(guard) => return Ok(guard),
            // Balances are written only after a unit fully validates, so a
            // poisoned value is still consistent.
            Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                let waited = started.elapsed();
                if waited >= policy.max_wait {
                    log::trace!("[ledger] lock wait on {id} exceeded {:?}", policy.max_wait);
                    return Err(LedgerError::Conflict { account: id.clone() });
                }
                thread::sleep(interval.min(policy.max_wait - waited));
                interval = policy.next_poll_interval(interval);
            }
        }
    }
}
