use crate::engine::{
    account::AccountId,
    error::RequestError,
    money::Money,
    request::{RequestRecord, RequestType},
};

/// A well-formed withdrawal request.
///
/// Withdrawals debit the source account. If the account does not hold enough
/// funds when the request runs, the withdrawal fails and nothing is recorded.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    account: AccountId,
    amount: Money,
    description: Option<String>,
}

impl Withdrawal {
    pub fn new(account: AccountId, amount: Money, description: Option<String>) -> Self {
        Self {
            account,
            amount,
            description,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn into_parts(self) -> (AccountId, Money, Option<String>) {
        (self.account, self.amount, self.description)
    }
}

impl TryFrom<RequestRecord> for Withdrawal {
    type Error = RequestError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        if let RequestRecord {
            request_type: RequestType::Withdraw,
            from: Some(from),
            to: None,
            amount: Some(amount),
            description,
        } = &record
        {
            let amount = amount.parse::<Money>().map_err(RequestError::InvalidAmount)?;
            return Ok(Withdrawal::new(from.clone(), amount, description.clone()));
        }
        Err(RequestError::InvalidRequest(record))
    }
}
