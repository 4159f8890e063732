use crate::engine::{
    account::AccountId,
    error::RequestError,
    money::Money,
    request::{RequestRecord, RequestType},
};

/// A well-formed transfer request between two accounts.
///
/// A transfer with the same source and destination is still well-formed here;
/// the engine rejects it before touching any balance.
#[derive(Debug, Clone)]
pub struct Transfer {
    from: AccountId,
    to: AccountId,
    amount: Money,
    description: Option<String>,
}

impl Transfer {
    pub fn new(from: AccountId, to: AccountId, amount: Money, description: Option<String>) -> Self {
        Self {
            from,
            to,
            amount,
            description,
        }
    }

    pub fn from(&self) -> &AccountId {
        &self.from
    }

    pub fn to(&self) -> &AccountId {
        &self.to
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn into_parts(self) -> (AccountId, AccountId, Money, Option<String>) {
        (self.from, self.to, self.amount, self.description)
    }
}

impl TryFrom<RequestRecord> for Transfer {
    type Error = RequestError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        if let RequestRecord {
            request_type: RequestType::Transfer,
            from: Some(from),
            to: Some(to),
            amount: Some(amount),
            description,
        } = &record
        {
            let amount = amount.parse::<Money>().map_err(RequestError::InvalidAmount)?;
            return Ok(Transfer::new(
                from.clone(),
                to.clone(),
                amount,
                description.clone(),
            ));
        }
        Err(RequestError::InvalidRequest(record))
    }
}
