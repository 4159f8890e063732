use std::fmt;

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Opaque account identifier. Ordering defines the global lock order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the entity controlling an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time view of an account, as exported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    #[serde(rename = "account")]
    id: AccountId,
    owner: OwnerId,
    balance: Money,
}

impl Account {
    pub(super) fn new(id: AccountId, owner: OwnerId, balance: Money) -> Self {
        Self { id, owner, balance }
    }

    /// Returns the account ID
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the owner of the account
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns the balance at the time of the snapshot
    pub fn balance(&self) -> Money {
        self.balance
    }
}

/// Read-only account metadata lookups used by the boundary layer.
pub trait AccountDirectory {
    fn exists(&self, id: &AccountId) -> bool;

    fn owner_of(&self, id: &AccountId) -> Option<OwnerId>;

    /// All accounts controlled by `owner`, sorted by id.
    fn accounts_of(&self, owner: &OwnerId) -> Vec<AccountId>;
}

/// Raw `account,owner` row used to seed the directory.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct AccountRecord {
    pub account: AccountId,
    pub owner: OwnerId,
}
