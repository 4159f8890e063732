mod deposit;
mod transfer;
mod withdrawal;

pub use deposit::Deposit;
pub use transfer::Transfer;
pub use withdrawal::Withdrawal;

use super::account::AccountId;
use crate::engine::error::RequestError;
use serde::Deserialize;

/// Raw request as parsed from CSV input.
/// This is the unvalidated form that needs conversion to a specific Request type.
#[derive(Debug, Deserialize, Clone)]
pub struct RequestRecord {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    /// Source account: required for Withdraw/Transfer, must be empty for Deposit
    pub from: Option<AccountId>,
    /// Destination account: required for Deposit/Transfer, must be empty for Withdraw
    pub to: Option<AccountId>,
    /// Kept as the text that was read and parsed into `Money` on conversion
    pub amount: Option<String>,
    pub description: Option<String>,
}

impl std::fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.request_type)?;
        if let Some(from) = &self.from {
            write!(f, " (from: {from})")?;
        }
        if let Some(to) = &self.to {
            write!(f, " (to: {to})")?;
        }
        match &self.amount {
            Some(amount) => write!(f, " amount: {amount}"),
            None => write!(f, " amount: <missing>"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Deposit,
    Withdraw,
    Transfer,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Deposit => write!(f, "deposit"),
            RequestType::Withdraw => write!(f, "withdraw"),
            RequestType::Transfer => write!(f, "transfer"),
        }
    }
}

/// A well-formed request ready for the ledger engine.
///
/// Shape is checked here; amount sign, account existence and funds are checked
/// by the engine when the request runs.
#[derive(Debug, Clone)]
pub enum Request {
    Deposit(Deposit),
    Withdrawal(Withdrawal),
    Transfer(Transfer),
}

impl TryFrom<RequestRecord> for Request {
    type Error = RequestError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        match record.request_type {
            RequestType::Deposit => Ok(Request::Deposit(Deposit::try_from(record)?)),
            RequestType::Withdraw => Ok(Request::Withdrawal(Withdrawal::try_from(record)?)),
            RequestType::Transfer => Ok(Request::Transfer(Transfer::try_from(record)?)),
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Deposit(d) => {
                write!(f, "[deposit] to={} amount={}", d.account(), d.amount())
            }
            Request::Withdrawal(w) => {
                write!(f, "[withdraw] from={} amount={}", w.account(), w.amount())
            }
            Request::Transfer(t) => {
                write!(
                    f,
                    "[transfer] from={} to={} amount={}",
                    t.from(),
                    t.to(),
                    t.amount()
                )
            }
        }
    }
}
