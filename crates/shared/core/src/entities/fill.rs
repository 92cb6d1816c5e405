use serde::{Deserialize, Serialize};

use super::{AccountName, Order};
use crate::values::{Amount, Currency, Timestamp};

/// Where an executed order came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillSource {
    /// Submitted by the caller through `fill_order`
    External,
    /// Injected by a filter during a time step
    Filter,
}

/// Whether the order behind a fill changed any balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillStatus {
    Executed,
    /// No usable rate at the instant; no balance changed
    Skipped,
}

/// One balance change caused by a fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: AccountName,
    /// Magnitude moved, in the account's own currency
    pub amount: Amount,
    pub currency: Currency,
}

impl Posting {
    pub fn new(account: impl Into<AccountName>, amount: Amount, currency: Currency) -> Self {
        Self {
            account: account.into(),
            amount,
            currency,
        }
    }
}

/// Record of a submitted order with the resolved balance changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Submission sequence number within one ledger
    pub sequence: u64,
    pub time: Timestamp,
    pub order: Order,
    pub source: FillSource,
    pub status: FillStatus,
    /// Amount taken from an account, if any
    pub debit: Option<Posting>,
    /// Amount added to an account, if any
    pub credit: Option<Posting>,
}

impl Fill {
    /// Record of an order that could not be executed
    pub fn skipped(sequence: u64, time: Timestamp, order: Order, source: FillSource) -> Self {
        Self {
            sequence,
            time,
            order,
            source,
            status: FillStatus::Skipped,
            debit: None,
            credit: None,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.status == FillStatus::Executed
    }

    /// (from, to) of the underlying transfer order, executed or not
    pub fn transfer_endpoints(&self) -> Option<(&str, &str)> {
        self.order.transfer_endpoints()
    }

    pub fn is_transfer(&self) -> bool {
        self.transfer_endpoints().is_some()
    }
}
