use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_broker::{Broker, OrderOutcome};
use tally_core::{AccountName, Amount, Currency, Order, Timestamp};

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::observer::{BrokerObserver, PORTFOLIO};

/// What a strategy can see when asked for an allocation
pub struct AllocationContext<'a> {
    pub broker: &'a Broker,
    pub observer: &'a BrokerObserver,
    /// Current weights of the non-cash accounts
    pub weights: &'a BTreeMap<AccountName, Decimal>,
}

/// Portfolio allocation policy
pub trait AllocationStrategy {
    /// Target weight per non-cash account; the remainder stays in cash
    ///
    /// Accounts left out are targeted at zero. Returning None skips this
    /// rebalancing date.
    fn target_allocation(&mut self, ctx: &AllocationContext<'_>) -> Option<BTreeMap<AccountName, Decimal>>;

    fn name(&self) -> &str {
        "AllocationStrategy"
    }
}

/// Constant target weights
pub struct FixedWeights {
    weights: BTreeMap<AccountName, Decimal>,
}

impl FixedWeights {
    pub fn new<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<AccountName>,
    {
        Self {
            weights: weights.into_iter().map(|(name, w)| (name.into(), w)).collect(),
        }
    }
}

impl AllocationStrategy for FixedWeights {
    fn target_allocation(&mut self, _ctx: &AllocationContext<'_>) -> Option<BTreeMap<AccountName, Decimal>> {
        Some(self.weights.clone())
    }

    fn name(&self) -> &str {
        "FixedWeights"
    }
}

/// Orders moving the portfolio from `weights` to `targets`
///
/// Every order is a `BackwardTransfer` out of `cash_account` with an amount in
/// `numeraire`; a negative amount sells the asset back into cash. Accounts
/// whose trade would be worth less than `min_trade_value` are left alone.
pub fn rebalance_orders(
    cash_account: &str,
    numeraire: &Currency,
    weights: &BTreeMap<AccountName, Decimal>,
    targets: &BTreeMap<AccountName, Decimal>,
    nav: Amount,
    min_trade_value: Amount,
) -> Vec<Order> {
    weights
        .iter()
        .filter(|(account, _)| account.as_str() != cash_account)
        .filter_map(|(account, weight)| {
            let target = targets.get(account).copied().unwrap_or(Decimal::ZERO);
            let value = (target - weight) * nav;
            if value.abs() < min_trade_value {
                return None;
            }
            Some(Order::backward_transfer(
                cash_account.to_string(),
                account.clone(),
                value,
                numeraire.clone(),
            ))
        })
        .collect()
}

/// Drives a broker on behalf of an allocation strategy
pub struct StrategyRunner<S: AllocationStrategy> {
    broker: Broker,
    strategy: S,
    config: RunnerConfig,
    observer: BrokerObserver,
    last_trade_day: Option<NaiveDate>,
}

impl<S: AllocationStrategy> StrategyRunner<S> {
    pub fn new(broker: Broker, strategy: S, config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        if broker.get_account(&config.cash_account).is_none() {
            return Err(tally_broker::BrokerError::UnknownAccount(config.cash_account.clone()).into());
        }

        let observer = BrokerObserver::new(&broker);
        Ok(Self {
            broker,
            strategy,
            config,
            observer,
            last_trade_day: None,
        })
    }

    /// Run the strategy loop
    ///
    /// Steps the broker, observing only, until `start_time`; then for at most
    /// `max_iterations` steps observes, rebalances when due and advances.
    /// Stops early when the market runs out of data. Returns the number of
    /// rebalancing dates evaluated.
    pub fn run(&mut self, start_time: Timestamp, max_iterations: usize) -> Result<usize> {
        info!(
            "[{}] Running from {} until {} ({} iterations max)",
            self.strategy.name(),
            self.broker.get_time(),
            start_time,
            max_iterations
        );

        while self.broker.get_time() < start_time {
            self.observer.update(&self.broker);
            if self.broker.next().is_none() {
                warn!("Market exhausted before start time {}", start_time);
                return Ok(0);
            }
        }

        let mut evaluated = 0;
        for _ in 0..max_iterations {
            self.observer.update(&self.broker);

            let today = self.broker.get_time().date_naive();
            if self.is_due(today) {
                self.trade()?;
                self.last_trade_day = Some(today);
                evaluated += 1;
            } else {
                debug!("Skip trading on {}", self.broker.get_time());
            }

            if self.broker.next().is_none() {
                break;
            }
        }

        info!(
            "[{}] Finished at {} after {} rebalancing dates",
            self.strategy.name(),
            self.broker.get_time(),
            evaluated
        );
        Ok(evaluated)
    }

    fn is_due(&self, today: NaiveDate) -> bool {
        match self.last_trade_day {
            Some(last) => (today - last).num_days() >= self.config.trade_every_n_days,
            None => true,
        }
    }

    fn trade(&mut self) -> Result<()> {
        for order in self.orders()? {
            match self.broker.fill_order(order)? {
                OrderOutcome::Filled(fill) => debug!("Rebalanced: {}", fill.order),
                OrderOutcome::Skipped(e) => warn!("Rebalancing order skipped: {}", e),
            }
        }
        Ok(())
    }

    fn orders(&mut self) -> Result<Vec<Order>> {
        let cash = self.config.cash_account.as_str();
        let (weights, nav) = match (self.broker.get_weight_all_accounts(), self.broker.get_nav()) {
            (Ok(weights), Ok(nav)) => (weights, nav),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Portfolio value is not well-defined at {}: {}", self.broker.get_time(), e);
                return Ok(Vec::new());
            }
        };
        let weights: BTreeMap<AccountName, Decimal> =
            weights.into_iter().filter(|(account, _)| account != cash).collect();

        let ctx = AllocationContext {
            broker: &self.broker,
            observer: &self.observer,
            weights: &weights,
        };
        let Some(targets) = self.strategy.target_allocation(&ctx) else {
            info!("No target allocation at {}", self.broker.get_time());
            self.observer.save((PORTFOLIO, "reallocation_mass"), Decimal::ZERO);
            return Ok(Vec::new());
        };

        for account in targets.keys() {
            if account == cash {
                return Err(RunnerError::CashTargeted(account.clone()));
            }
            if !weights.contains_key(account) {
                return Err(RunnerError::UnknownTarget(account.clone()));
            }
        }

        let mass: Decimal = weights
            .iter()
            .map(|(account, weight)| (targets.get(account).copied().unwrap_or(Decimal::ZERO) - weight).abs())
            .sum();
        if mass < self.config.max_rel_alloc_deviation {
            info!(
                "Reallocation mass of {:.4} is below the threshold of {:.4}: No rebalancing.",
                mass, self.config.max_rel_alloc_deviation
            );
            self.observer.save((PORTFOLIO, "reallocation_mass"), Decimal::ZERO);
            self.observer.save((PORTFOLIO, "turnover_rate"), Decimal::ZERO);
            return Ok(Vec::new());
        }

        info!("Reallocation mass: {:.4}", mass);
        self.observer.save((PORTFOLIO, "reallocation_mass"), mass);

        let orders = rebalance_orders(
            cash,
            self.broker.get_default_numeraire(),
            &weights,
            &targets,
            nav,
            self.config.min_trade_value,
        );
        let traded: Decimal = orders
            .iter()
            .filter_map(|order| match order {
                Order::BackwardTransfer { amount, .. } => Some(amount.amount.abs()),
                _ => None,
            })
            .sum();
        self.observer.save((PORTFOLIO, "turnover_rate"), traded / nav);
        Ok(orders)
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    pub fn observer(&self) -> &BrokerObserver {
        &self.observer
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn into_broker(self) -> Broker {
        self.broker
    }
}
