use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tally_core::{AccountName, Currency, Fill, FillSource, Money, Order};
use tally_ports::{Filter, FilterOutput, LedgerView};

use super::FeeModel;

/// Charges a transaction cost for transfers into or out of a set of accounts
///
/// A submitted transfer is charged when exactly one of its endpoints is
/// watched; moves between two watched accounts are internal rebookings and
/// free. The fee depends on the order alone, so a transfer skipped for want of
/// a rate is charged like an executed one. It is collected from
/// `fee_account`, in its currency, and accumulated into the variable
/// `variable`:
///
/// - without a collector, a `Withdraw` order takes the fee out of the ledger,
///   so portfolio value drops by exactly the amount recorded
/// - with a collector, a `BackwardTransfer` moves it to the collector account
pub struct TransactionCostFilter {
    fee_account: AccountName,
    fee: FeeModel,
    variable: String,
    watched: BTreeSet<AccountName>,
    collector: Option<AccountName>,
}

impl TransactionCostFilter {
    pub fn new<I, S>(fee_account: impl Into<AccountName>, fee: FeeModel, variable: impl Into<String>, watched: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AccountName>,
    {
        Self {
            fee_account: fee_account.into(),
            fee,
            variable: variable.into(),
            watched: watched.into_iter().map(Into::into).collect(),
            collector: None,
        }
    }

    /// Pay fees to `collector` instead of removing them from the ledger
    pub fn with_collector(mut self, collector: impl Into<AccountName>) -> Self {
        self.collector = Some(collector.into());
        self
    }

    /// Whether the order behind `fill` crosses the boundary of the watched set
    fn is_charged(&self, fill: &Fill) -> bool {
        if fill.source != FillSource::External {
            return false;
        }
        match fill.transfer_endpoints() {
            Some((from, to)) => self.watched.contains(from) != self.watched.contains(to),
            None => false,
        }
    }

    /// Fee for one order, in the fee account's currency
    fn fee_for(&self, fill: &Fill, fee_currency: &Currency, view: &dyn LedgerView) -> Option<Money> {
        let value = if self.fee.is_proportional() {
            let amount = fill.order.amount()?;
            match view.cross_rate(&amount.currency, fee_currency) {
                Ok(rate) => amount.amount * rate,
                Err(e) => {
                    warn!("[{}] Cannot value fill #{}: {}", self.name(), fill.sequence, e);
                    return None;
                }
            }
        } else {
            Decimal::ZERO
        };

        Some(Money::new(self.fee.calculate_fee(value), fee_currency.clone()))
    }

    /// The order that collects `fee` from the fee account
    fn collection_order(&self, fee: &Money, view: &dyn LedgerView) -> Option<Order> {
        let Some(collector) = &self.collector else {
            return Some(Order::withdraw(
                self.fee_account.clone(),
                fee.amount,
                fee.currency.clone(),
            ));
        };

        // The transfer must be able to execute, or the variable would overstate
        // what was actually paid
        let collector_currency = &view.account(collector)?.currency;
        if let Err(e) = view.rate(&fee.currency, collector_currency) {
            warn!("[{}] Cannot pay collector {}: {}", self.name(), collector, e);
            return None;
        }
        Some(Order::backward_transfer(
            self.fee_account.clone(),
            collector.clone(),
            fee.amount,
            fee.currency.clone(),
        ))
    }
}

impl Filter for TransactionCostFilter {
    fn apply(&mut self, fills: &[Fill], view: &dyn LedgerView) -> FilterOutput {
        let mut output = FilterOutput::default();
        let mut total = Decimal::ZERO;

        let Some(fee_currency) = view.account(&self.fee_account).map(|a| a.currency.clone()) else {
            warn!("[{}] Fee account {} missing, nothing charged", self.name(), self.fee_account);
            output.variables.push((self.variable.clone(), total));
            return output;
        };

        for fill in fills.iter().filter(|f| self.is_charged(f)) {
            let Some(fee) = self.fee_for(fill, &fee_currency, view) else {
                continue;
            };
            if fee.amount.is_zero() {
                continue;
            }
            let Some(order) = self.collection_order(&fee, view) else {
                continue;
            };

            debug!(
                "[{}] {} #{} ({:?}) charged {}",
                self.name(),
                fill.order.kind(),
                fill.sequence,
                fill.status,
                fee
            );
            total += fee.amount;
            output.orders.push(order);
        }

        // Always report, so the variable exists from the first step
        output.variables.push((self.variable.clone(), total));
        output
    }

    fn name(&self) -> &str {
        "TransactionCostFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketView;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use tally_core::{Account, CurrencyPair, FillStatus, Posting, Timestamp};
    use tally_rates::RateStore;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    fn rates() -> RateStore {
        RateStore::from_series([(CurrencyPair::new("EUR", "USD"), vec![(t0(), dec!(2))])]).unwrap()
    }

    fn accounts() -> BTreeMap<AccountName, Account> {
        [
            Account::new("EUR_CASH", dec!(100), "EUR"),
            Account::new("USD_CASH", dec!(0), "USD"),
            Account::new("FEES", dec!(0), "USD"),
            Account::new("SPX", dec!(0), "SPX"),
        ]
        .into_iter()
        .map(|a| (a.name.clone(), a))
        .collect()
    }

    fn transfer(sequence: u64, from: &str, from_ccy: &str, to: &str, to_ccy: &str, credit: Decimal) -> Fill {
        Fill {
            sequence,
            time: t0(),
            order: Order::backward_transfer(from, to, credit, to_ccy),
            source: FillSource::External,
            status: FillStatus::Executed,
            debit: Some(Posting::new(from, credit, Currency::new(from_ccy))),
            credit: Some(Posting::new(to, credit, Currency::new(to_ccy))),
        }
    }

    #[test]
    fn test_only_boundary_crossing_transfers_charged() {
        let mut filter =
            TransactionCostFilter::new("EUR_CASH", FeeModel::fixed(dec!(5)), "tc", ["EUR_CASH", "USD_CASH"]);
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let fills = vec![
            transfer(1, "EUR_CASH", "EUR", "SPX", "SPX", dec!(1)),
            transfer(2, "USD_CASH", "USD", "EUR_CASH", "EUR", dec!(1)),
            transfer(3, "SPX", "SPX", "USD_CASH", "USD", dec!(1)),
        ];
        let output = filter.apply(&fills, &view);

        assert_eq!(output.orders.len(), 2);
        assert_eq!(output.orders[0], Order::withdraw("EUR_CASH", dec!(5), "EUR"));
        assert_eq!(output.variables, vec![("tc".to_string(), dec!(10))]);
    }

    #[test]
    fn test_filter_fills_not_charged() {
        let mut filter = TransactionCostFilter::new("EUR_CASH", FeeModel::fixed(dec!(5)), "tc", ["EUR_CASH"]);
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let mut fill = transfer(1, "EUR_CASH", "EUR", "SPX", "SPX", dec!(1));
        fill.source = FillSource::Filter;
        let output = filter.apply(&[fill], &view);

        assert!(output.orders.is_empty());
        assert_eq!(output.variables, vec![("tc".to_string(), dec!(0))]);
    }

    #[test]
    fn test_skipped_transfers_charged_from_order() {
        let mut filter =
            TransactionCostFilter::new("EUR_CASH", FeeModel::fixed(dec!(5)), "tc", ["EUR_CASH", "USD_CASH"]);
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let order = Order::backward_transfer("EUR_CASH", "JPY_CASH", dec!(5), "EUR");
        let fills = vec![
            Fill::skipped(1, t0(), order.clone(), FillSource::External),
            Fill::skipped(2, t0(), order, FillSource::External),
            transfer(3, "EUR_CASH", "EUR", "USD_CASH", "USD", dec!(10)),
        ];
        let output = filter.apply(&fills, &view);

        assert_eq!(output.orders.len(), 2);
        assert_eq!(output.variables, vec![("tc".to_string(), dec!(10))]);
    }

    #[test]
    fn test_proportional_fee_in_fee_currency() {
        // 50 bps, fee account in EUR, transfer credited 200 USD = 100 EUR
        let mut filter = TransactionCostFilter::new("EUR_CASH", FeeModel::bps(dec!(50)), "tc", ["EUR_CASH"]);
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let output = filter.apply(&[transfer(1, "EUR_CASH", "EUR", "USD_CASH", "USD", dec!(200))], &view);
        assert_eq!(output.orders, vec![Order::withdraw("EUR_CASH", dec!(0.5), "EUR")]);
        assert_eq!(output.variables, vec![("tc".to_string(), dec!(0.5))]);
    }

    #[test]
    fn test_collector_receives_fee() {
        let mut filter = TransactionCostFilter::new("EUR_CASH", FeeModel::fixed(dec!(1)), "tc", ["EUR_CASH"])
            .with_collector("FEES");
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let output = filter.apply(&[transfer(1, "EUR_CASH", "EUR", "USD_CASH", "USD", dec!(2))], &view);
        assert_eq!(
            output.orders,
            vec![Order::backward_transfer("EUR_CASH", "FEES", dec!(1), "EUR")]
        );
    }

    #[test]
    fn test_unconvertible_fee_skipped() {
        // SPX has no rate against EUR
        let mut filter = TransactionCostFilter::new("EUR_CASH", FeeModel::bps(dec!(50)), "tc", ["EUR_CASH"]);
        let (rates, accounts) = (rates(), accounts());
        let view = MarketView::new(&rates, t0(), &accounts);

        let output = filter.apply(&[transfer(1, "EUR_CASH", "EUR", "SPX", "SPX", dec!(1))], &view);
        assert!(output.orders.is_empty());
        assert_eq!(output.variables, vec![("tc".to_string(), dec!(0))]);
    }
}
