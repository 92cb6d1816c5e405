use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_core::{
    Account, AccountName, Amount, Currency, Fill, FillSource, FillStatus, Order, Posting, Rate, Timestamp,
    Variables,
};
use tally_market::Market;
use tally_ports::{RateError, RateResult};

use crate::accounts::AccountBook;
use crate::error::{BrokerError, Result};
use crate::execution::{Execute, ExecutionContext, Resolution};

/// Lifecycle of a broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    /// Accepting orders between steps
    Accepting,
    /// Inside `next()`: clock advance, filter pass, filter order execution
    Stepping,
    /// The market has no further data; `next()` is a no-op
    Exhausted,
}

/// Result of submitting an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Filled(Fill),
    /// No usable rate at the current instant; nothing changed and the order
    /// will not be retried
    Skipped(RateError),
}

impl OrderOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderOutcome::Filled(_))
    }

    pub fn fill(&self) -> Option<&Fill> {
        match self {
            OrderOutcome::Filled(fill) => Some(fill),
            OrderOutcome::Skipped(_) => None,
        }
    }
}

/// The ledger: owns the accounts, executes orders, steps the market
pub struct Broker {
    market: Market,
    accounts: AccountBook,
    variables: Variables,
    /// Caller submissions since the previous step, skipped ones included,
    /// handed to the filters
    pending: Vec<Fill>,
    /// Every executed fill of the run, in execution order
    history: Vec<Fill>,
    sequence: u64,
    state: BrokerState,
}

impl Broker {
    /// Create a broker and execute `initial_orders` (typically account
    /// creations) at the market's start time
    pub fn new(market: Market, initial_orders: impl IntoIterator<Item = Order>) -> Result<Self> {
        let mut broker = Self {
            market,
            accounts: AccountBook::new(),
            variables: Variables::new(),
            pending: Vec::new(),
            history: Vec::new(),
            sequence: 0,
            state: BrokerState::Accepting,
        };

        for order in initial_orders {
            if let OrderOutcome::Skipped(e) = broker.fill_order(order)? {
                warn!("Initial order skipped: {}", e);
            }
        }

        info!(
            "Broker ready at {} with {} accounts",
            broker.market.now(),
            broker.accounts.len()
        );
        Ok(broker)
    }

    /// Execute an order immediately at the current market instant
    ///
    /// Structural problems (duplicate or unknown account) are returned as
    /// errors. A missing rate is not: the order is skipped, balances are left
    /// unchanged and the reason is reported in the outcome. Filters still see
    /// the skipped order on the next step.
    pub fn fill_order(&mut self, order: Order) -> Result<OrderOutcome> {
        self.execute(order, FillSource::External)
    }

    fn execute(&mut self, order: Order, source: FillSource) -> Result<OrderOutcome> {
        let ctx = ExecutionContext {
            rates: self.market.rates(),
            at: self.market.now(),
        };

        let resolution = match order.resolve(&self.accounts, &ctx) {
            Ok(resolution) => resolution,
            Err(BrokerError::Rate(e)) => {
                warn!("Order skipped at {}: {} ({})", ctx.at, order, e);
                if source == FillSource::External {
                    self.sequence += 1;
                    self.pending.push(Fill::skipped(self.sequence, ctx.at, order, source));
                }
                return Ok(OrderOutcome::Skipped(e));
            }
            Err(e) => return Err(e),
        };
        resolution.commit(&mut self.accounts)?;

        self.sequence += 1;
        let (debit, credit) = match resolution {
            Resolution::Open(account) => {
                let credit = Posting::new(account.name, account.balance, account.currency);
                (None, Some(credit))
            }
            Resolution::Post { debit, credit } => (debit, credit),
        };
        let fill = Fill {
            sequence: self.sequence,
            time: ctx.at,
            order,
            source,
            status: FillStatus::Executed,
            debit,
            credit,
        };
        debug!(
            "Fill #{} ({}) at {}: {}",
            fill.sequence,
            fill.order.kind(),
            fill.time,
            fill.order
        );

        if source == FillSource::External {
            self.pending.push(fill.clone());
        }
        self.history.push(fill.clone());
        Ok(OrderOutcome::Filled(fill))
    }

    /// Advance to the next instant and resolve the step
    ///
    /// Runs the market's filters over the fills since the previous step,
    /// records their variable increments and executes the orders they emit.
    /// Returns the new instant, or None once the market is out of data, after
    /// which the broker stays exhausted.
    pub fn next(&mut self) -> Option<Timestamp> {
        if self.state == BrokerState::Exhausted {
            return None;
        }
        self.state = BrokerState::Stepping;

        let fills = std::mem::take(&mut self.pending);
        let Some(step) = self.market.advance(&fills, self.accounts.as_map()) else {
            if !fills.is_empty() {
                debug!(
                    "{} fills submitted after the last step were never seen by filters",
                    fills.len()
                );
            }
            info!("Broker exhausted at {} after {} fills", self.market.now(), self.history.len());
            self.state = BrokerState::Exhausted;
            return None;
        };

        for (name, delta) in &step.output.variables {
            self.variables.add(name, *delta);
        }
        for order in step.output.orders {
            match self.execute(order, FillSource::Filter) {
                Ok(OrderOutcome::Filled(_)) => {}
                Ok(OrderOutcome::Skipped(e)) => warn!("Filter order skipped: {}", e),
                Err(e) => warn!("Filter order rejected: {}", e),
            }
        }

        self.state = BrokerState::Accepting;
        Some(step.time)
    }

    pub fn state(&self) -> BrokerState {
        self.state
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Current simulated instant
    pub fn get_time(&self) -> Timestamp {
        self.market.now()
    }

    pub fn get_default_numeraire(&self) -> &Currency {
        self.market.default_numeraire()
    }

    /// Units of `to` per one unit of `from` at the current instant, as
    /// orders execute
    pub fn get_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.market.get_rate(from, to)
    }

    /// Rate used by the valuation queries
    pub fn get_cross_rate(&self, from: &Currency, to: &Currency) -> RateResult<Rate> {
        self.market.get_cross_rate(from, to)
    }

    pub fn get_account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Snapshot of every account as (balance, currency)
    pub fn get_accounts(&self) -> BTreeMap<AccountName, (Amount, Currency)> {
        self.accounts
            .iter()
            .map(|a| (a.name.clone(), a.position()))
            .collect()
    }

    /// Value of each account in `currency` at the current instant
    pub fn get_value_all_accounts(&self, currency: &Currency) -> Result<BTreeMap<AccountName, Amount>> {
        self.accounts
            .iter()
            .map(|a| -> Result<(AccountName, Amount)> {
                let rate = self.market.get_cross_rate(&a.currency, currency)?;
                Ok((a.name.clone(), a.balance * rate))
            })
            .collect()
    }

    /// Total value of all accounts in `currency` at the current instant
    pub fn get_value_portfolio(&self, currency: &Currency) -> Result<Amount> {
        Ok(self.get_value_all_accounts(currency)?.values().sum())
    }

    /// Total value in the default numeraire
    pub fn get_nav(&self) -> Result<Amount> {
        self.get_value_portfolio(self.market.default_numeraire())
    }

    /// Each account's share of the portfolio, valued in the default numeraire
    pub fn get_weight_all_accounts(&self) -> Result<BTreeMap<AccountName, Decimal>> {
        let values = self.get_value_all_accounts(self.market.default_numeraire())?;
        let total: Amount = values.values().sum();
        if total.is_zero() {
            return Err(BrokerError::ZeroPortfolioValue);
        }
        Ok(values.into_iter().map(|(name, value)| (name, value / total)).collect())
    }

    /// Snapshot of the filter variables
    pub fn get_variables(&self) -> BTreeMap<String, Decimal> {
        self.variables.to_map()
    }

    /// Every executed fill so far, caller and filter orders alike
    pub fn get_fills(&self) -> &[Fill] {
        &self.history
    }
}
