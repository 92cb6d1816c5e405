use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Amount, Currency};

/// Account identifier (unique within a ledger)
pub type AccountName = String;

/// A ledger account: a signed balance in a currency fixed at creation
///
/// The balance only changes through order execution; accounts are never
/// removed once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: AccountName,
    pub balance: Amount,
    pub currency: Currency,
}

impl Account {
    pub fn new(name: impl Into<AccountName>, balance: Amount, currency: impl Into<Currency>) -> Self {
        Self {
            name: name.into(),
            balance,
            currency: currency.into(),
        }
    }

    /// Add `delta` (may be negative) to the balance
    pub fn apply(&mut self, delta: Amount) {
        self.balance += delta;
    }

    pub fn is_empty(&self) -> bool {
        self.balance == Decimal::ZERO
    }

    /// (balance, currency) view, the shape callers read back from the ledger
    pub fn position(&self) -> (Amount, Currency) {
        (self.balance, self.currency.clone())
    }
}
