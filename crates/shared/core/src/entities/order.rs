use serde::{Deserialize, Serialize};

use super::AccountName;
use crate::values::{Amount, Currency, Money};

/// An instruction to the ledger
///
/// Orders are a closed set; the executor handles every variant exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Order {
    /// Open a new account with an initial balance; the currency is fixed for life
    CreateAccount {
        account: AccountName,
        initial: Money,
    },
    /// `to` receives exactly `amount` (converted into its currency);
    /// `from` is debited the equivalent value in its own currency
    BackwardTransfer {
        from: AccountName,
        to: AccountName,
        amount: Money,
    },
    /// `from` gives exactly `amount` (converted into its currency);
    /// `to` is credited the equivalent value in its own currency
    ForwardTransfer {
        from: AccountName,
        to: AccountName,
        amount: Money,
    },
    /// External inflow into a single account
    Deposit { account: AccountName, amount: Money },
    /// External outflow from a single account (e.g. fees paid to a venue)
    Withdraw { account: AccountName, amount: Money },
}

impl Order {
    pub fn create_account(
        account: impl Into<AccountName>,
        initial_balance: Amount,
        currency: impl Into<Currency>,
    ) -> Self {
        Order::CreateAccount {
            account: account.into(),
            initial: Money::new(initial_balance, currency),
        }
    }

    pub fn backward_transfer(
        from: impl Into<AccountName>,
        to: impl Into<AccountName>,
        amount: Amount,
        currency: impl Into<Currency>,
    ) -> Self {
        Order::BackwardTransfer {
            from: from.into(),
            to: to.into(),
            amount: Money::new(amount, currency),
        }
    }

    pub fn forward_transfer(
        from: impl Into<AccountName>,
        to: impl Into<AccountName>,
        amount: Amount,
        currency: impl Into<Currency>,
    ) -> Self {
        Order::ForwardTransfer {
            from: from.into(),
            to: to.into(),
            amount: Money::new(amount, currency),
        }
    }

    pub fn deposit(account: impl Into<AccountName>, amount: Amount, currency: impl Into<Currency>) -> Self {
        Order::Deposit {
            account: account.into(),
            amount: Money::new(amount, currency),
        }
    }

    pub fn withdraw(account: impl Into<AccountName>, amount: Amount, currency: impl Into<Currency>) -> Self {
        Order::Withdraw {
            account: account.into(),
            amount: Money::new(amount, currency),
        }
    }

    /// Short variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Order::CreateAccount { .. } => "create_account",
            Order::BackwardTransfer { .. } => "backward_transfer",
            Order::ForwardTransfer { .. } => "forward_transfer",
            Order::Deposit { .. } => "deposit",
            Order::Withdraw { .. } => "withdraw",
        }
    }

    /// (from, to) for transfer orders
    pub fn transfer_endpoints(&self) -> Option<(&str, &str)> {
        match self {
            Order::BackwardTransfer { from, to, .. } | Order::ForwardTransfer { from, to, .. } => {
                Some((from.as_str(), to.as_str()))
            }
            Order::CreateAccount { .. } | Order::Deposit { .. } | Order::Withdraw { .. } => None,
        }
    }

    /// Amount named in the order, if it moves value
    pub fn amount(&self) -> Option<&Money> {
        match self {
            Order::BackwardTransfer { amount, .. }
            | Order::ForwardTransfer { amount, .. }
            | Order::Deposit { amount, .. }
            | Order::Withdraw { amount, .. } => Some(amount),
            Order::CreateAccount { .. } => None,
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::CreateAccount { account, initial } => {
                write!(f, "CreateAccount({}, {})", account, initial)
            }
            Order::BackwardTransfer { from, to, amount } => {
                write!(f, "BackwardTransfer({} -> {}, {})", from, to, amount)
            }
            Order::ForwardTransfer { from, to, amount } => {
                write!(f, "ForwardTransfer({} -> {}, {})", from, to, amount)
            }
            Order::Deposit { account, amount } => write!(f, "Deposit({}, {})", account, amount),
            Order::Withdraw { account, amount } => write!(f, "Withdraw({}, {})", account, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_endpoints_and_amount() {
        let order = Order::backward_transfer("EUR_CASH", "USD_CASH", dec!(10), "EUR");
        assert_eq!(order.transfer_endpoints(), Some(("EUR_CASH", "USD_CASH")));
        assert_eq!(order.amount(), Some(&Money::new(dec!(10), "EUR")));
        assert_eq!(order.kind(), "backward_transfer");

        let order = Order::create_account("SPX", dec!(0), "SPX");
        assert_eq!(order.transfer_endpoints(), None);
        assert_eq!(order.amount(), None);
        assert_eq!(Order::withdraw("SPX", dec!(1), "SPX").transfer_endpoints(), None);
    }

    #[test]
    fn test_order_display() {
        let order = Order::backward_transfer("EUR_CASH", "USD_CASH", dec!(10), "EUR");
        assert_eq!(order.to_string(), "BackwardTransfer(EUR_CASH -> USD_CASH, 10 EUR)");
    }
}
