use crate::engine::{
    account::AccountId,
    error::RequestError,
    money::Money,
    request::{RequestRecord, RequestType},
};

/// A well-formed deposit request.
///
/// Deposits credit the destination account. There is no source account.
#[derive(Debug, Clone)]
pub struct Deposit {
    account: AccountId,
    amount: Money,
    description: Option<String>,
}

impl Deposit {
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

impl TryFrom<RequestRecord> for Deposit {
    type Error = RequestError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        if let RequestRecord {
            request_type: RequestType::Deposit,
            from: None,
            to: Some(to),
            amount: Some(amount),
            description,
        } = &record
        {
            let amount = amount.parse::<Money>().map_err(RequestError::InvalidAmount)?;
            return Ok(Deposit::new(to.clone(), amount, description.clone()));
        }
        Err(RequestError::InvalidRequest(record))
    }
}
