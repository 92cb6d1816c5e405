use tally_core::{Account, Amount, Currency, Money, Order, Posting, Rate, Timestamp};
use tally_ports::{RateResult, RateSource};

use crate::accounts::AccountBook;
use crate::error::Result;

/// Rates pinned to the instant an order executes at
pub struct ExecutionContext<'a> {
    pub rates: &'a dyn RateSource,
    pub at: Timestamp,
}

impl ExecutionContext<'_> {
    fn rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.rates.rate(from, to, self.at)
    }

    /// `money` expressed in `currency`
    fn convert(&self, money: &Money, currency: &Currency) -> Result<Amount> {
        Ok(money.amount * self.rate(&money.currency, currency)?)
    }
}

/// Balance changes an order resolves to
///
/// Resolution reads the book and the rates but mutates nothing, so an order
/// that fails half way leaves every balance as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Open(Account),
    Post {
        debit: Option<Posting>,
        credit: Option<Posting>,
    },
}

impl Resolution {
    /// Apply the resolved changes to the book
    pub(crate) fn commit(&self, book: &mut AccountBook) -> Result<()> {
        match self {
            Resolution::Open(account) => book.open(account.clone()),
            Resolution::Post { debit, credit } => {
                if let Some(debit) = debit {
                    book.debit(debit)?;
                }
                if let Some(credit) = credit {
                    book.credit(credit)?;
                }
                Ok(())
            }
        }
    }
}

/// Order execution capability, one arm per order kind
pub trait Execute {
    /// Work out what this order does to the book at the context's instant
    ///
    /// Fails with `UnknownAccount`/`DuplicateAccount` on structural problems
    /// and with `Rate` when a required conversion is unavailable.
    fn resolve(&self, book: &AccountBook, ctx: &ExecutionContext<'_>) -> Result<Resolution>;
}

impl Execute for Order {
    fn resolve(&self, book: &AccountBook, ctx: &ExecutionContext<'_>) -> Result<Resolution> {
        match self {
            Order::CreateAccount { account, initial } => {
                if book.contains(account) {
                    return Err(crate::BrokerError::DuplicateAccount(account.clone()));
                }
                Ok(Resolution::Open(Account::new(
                    account.clone(),
                    initial.amount,
                    initial.currency.clone(),
                )))
            }
            Order::BackwardTransfer { from, to, amount } => {
                let (from, to) = (book.require(from)?, book.require(to)?);
                let credit = ctx.convert(amount, &to.currency)?;
                let debit = ctx.convert(amount, &from.currency)?;
                Ok(transfer(from, debit, to, credit))
            }
            Order::ForwardTransfer { from, to, amount } => {
                let (from, to) = (book.require(from)?, book.require(to)?);
                let debit = ctx.convert(amount, &from.currency)?;
                let credit = debit * ctx.rate(&from.currency, &to.currency)?;
                Ok(transfer(from, debit, to, credit))
            }
            Order::Deposit { account, amount } => {
                let account = book.require(account)?;
                let credit = ctx.convert(amount, &account.currency)?;
                Ok(Resolution::Post {
                    debit: None,
                    credit: Some(Posting::new(account.name.clone(), credit, account.currency.clone())),
                })
            }
            Order::Withdraw { account, amount } => {
                let account = book.require(account)?;
                let debit = ctx.convert(amount, &account.currency)?;
                Ok(Resolution::Post {
                    debit: Some(Posting::new(account.name.clone(), debit, account.currency.clone())),
                    credit: None,
                })
            }
        }
    }
}

fn transfer(from: &Account, debit: Amount, to: &Account, credit: Amount) -> Resolution {
    Resolution::Post {
        debit: Some(Posting::new(from.name.clone(), debit, from.currency.clone())),
        credit: Some(Posting::new(to.name.clone(), credit, to.currency.clone())),
    }
}
