use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub(super) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdraw => write!(f, "WITHDRAW"),
            TransactionKind::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// Outcome stored with a record. Only successful movements are recorded, so
/// `Failed` is never produced by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// Immutable record of one money movement.
///
/// Deserializing checks the same amount and account invariants the engine
/// upholds when it creates a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRow")]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionKind,
    amount: Money,
    from: Option<AccountId>,
    to: Option<AccountId>,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    description: Option<String>,
}

impl Transaction {
    pub(super) fn new(
        kind: TransactionKind,
        amount: Money,
        from: Option<AccountId>,
        to: Option<AccountId>,
        description: Option<String>,
    ) -> Self {
        debug_assert_eq!(
            check_shape(kind, amount, from.as_ref(), to.as_ref()),
            Ok(()),
            "invalid {kind} record"
        );
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            from,
            to,
            status: TransactionStatus::Success,
            created_at: Utc::now(),
            description,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Source account; `None` for deposits.
    pub fn from(&self) -> Option<&AccountId> {
        self.from.as_ref()
    }

    /// Destination account; `None` for withdrawals.
    pub fn to(&self) -> Option<&AccountId> {
        self.to.as_ref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether `account` is the source or the destination of this record.
    pub fn touches(&self, account: &AccountId) -> bool {
        self.from.as_ref() == Some(account) || self.to.as_ref() == Some(account)
    }
}

fn check_shape(
    kind: TransactionKind,
    amount: Money,
    from: Option<&AccountId>,
    to: Option<&AccountId>,
) -> Result<(), &'static str> {
    if !amount.is_positive() {
        return Err("transaction amount must be positive");
    }
    let accounts_match = match kind {
        TransactionKind::Deposit => from.is_none() && to.is_some(),
        TransactionKind::Withdraw => from.is_some() && to.is_none(),
        TransactionKind::Transfer => from.is_some() && to.is_some() && from != to,
    };
    if accounts_match {
        Ok(())
    } else {
        Err("account references do not match the transaction kind")
    }
}

/// Wire form of a [`Transaction`], validated before it becomes one.
#[derive(Deserialize)]
struct TransactionRow {
    id: TransactionId,
    kind: TransactionKind,
    amount: Money,
    from: Option<AccountId>,
    to: Option<AccountId>,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    description: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = &'static str;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        check_shape(row.kind, row.amount, row.from.as_ref(), row.to.as_ref())?;
        Ok(Self {
            id: row.id,
            kind: row.kind,
            amount: row.amount,
            from: row.from,
            to: row.to,
            status: row.status,
            created_at: row.created_at,
            description: row.description,
        })
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] id={} amount={}", self.kind, self.id, self.amount)?;
        if let Some(from) = &self.from {
            write!(f, " from={from}")?;
        }
        if let Some(to) = &self.to {
            write!(f, " to={to}")?;
        }
        Ok(())
    }
}
