//! Strategy Runner Tests
//!
//! Full loop: rate store -> market -> broker -> runner, checking
//! rebalancing cadence, resulting weights and what the observer recorded.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_broker::{Broker, BrokerError};
use tally_core::{CurrencyPair, Order, Rate, Timestamp};
use tally_market::{FeeModel, Market, TransactionCostFilter};
use tally_rates::RateStore;
use tally_runner::{FixedWeights, RunnerConfig, RunnerError, StrategyRunner};

fn day(n: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// SPX doubles on day 45; it is quoted in EUR so rebalancing trades execute
fn store() -> RateStore {
    let spx: Vec<(Timestamp, Rate)> = (0..90)
        .map(|t| (day(t), if t < 45 { dec!(1000) } else { dec!(2000) }))
        .collect();
    let usd: Vec<(Timestamp, Rate)> = (0..90).map(|t| (day(t), dec!(2))).collect();
    RateStore::from_series([
        (CurrencyPair::new("SPX", "EUR"), spx),
        (CurrencyPair::new("EUR", "USD"), usd),
    ])
    .unwrap()
}

fn broker(market: Market) -> Broker {
    Broker::new(
        market,
        [
            Order::create_account("EUR_CASH", dec!(10000), "EUR"),
            Order::create_account("SPX", dec!(0), "SPX"),
        ],
    )
    .unwrap()
}

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < dec!(0.0000000001),
        "expected {} got {}",
        expected,
        actual
    );
}

#[test]
fn test_periodic_rebalancing() {
    let _ = env_logger::try_init();

    let market = Market::new(store(), vec![], "EUR", None).unwrap();
    let mut runner = StrategyRunner::new(
        broker(market),
        FixedWeights::new([("SPX", dec!(0.5))]),
        RunnerConfig::new("EUR_CASH"),
    )
    .unwrap();

    let evaluated = runner.run(day(10), 1000).unwrap();
    assert_eq!(evaluated, 3);

    let observer = runner.observer();
    let masses: Vec<_> = observer.history(("portfolio", "reallocation_mass")).to_vec();
    assert_eq!(masses.len(), 3);
    assert_eq!(masses[0], (day(10), dec!(0.5)));
    assert_eq!(masses[1], (day(40), dec!(0)));
    assert_eq!(masses[2].0, day(70));
    assert_close(masses[2].1, dec!(1) / dec!(6));

    // One NAV observation per instant, before and after the start time
    assert_eq!(observer.history(("portfolio", "nav")).len(), 90);
    assert_eq!(observer.recent(("SPX", "EUR")), Some(dec!(2000)));

    let broker = runner.broker();
    assert_eq!(broker.get_time(), day(89));
    let weights = broker.get_weight_all_accounts().unwrap();
    assert_close(weights["SPX"], dec!(0.5));
    assert_close(broker.get_nav().unwrap(), dec!(15000));
    assert_close(broker.get_accounts()["SPX"].0, dec!(3.75));
}

#[test]
fn test_fee_variable_observed() {
    let filter = TransactionCostFilter::new("EUR_CASH", FeeModel::fixed(dec!(1)), "tc", ["EUR_CASH"]);
    let market = Market::new(store(), vec![Box::new(filter)], "EUR", None).unwrap();
    let mut runner = StrategyRunner::new(
        broker(market),
        FixedWeights::new([("SPX", dec!(0.5))]),
        RunnerConfig::new("EUR_CASH").with_trade_every_n_days(1),
    )
    .unwrap();

    runner.run(day(0), 3).unwrap();

    // Bought on day 0, charged on day 1; weights then drift by the fee only
    let tc = runner.observer().history(("variable", "tc"));
    assert_eq!(tc, &[(day(1), dec!(1)), (day(2), dec!(1))]);
    assert_eq!(runner.broker().get_variables()["tc"], dec!(1));
}

#[test]
fn test_cash_account_cannot_be_targeted() {
    let market = Market::new(store(), vec![], "EUR", None).unwrap();
    let mut runner = StrategyRunner::new(
        broker(market),
        FixedWeights::new([("EUR_CASH", dec!(1))]),
        RunnerConfig::new("EUR_CASH"),
    )
    .unwrap();

    assert_eq!(
        runner.run(day(0), 10),
        Err(RunnerError::CashTargeted("EUR_CASH".to_string()))
    );
}

#[test]
fn test_unknown_cash_account() {
    let market = Market::new(store(), vec![], "EUR", None).unwrap();
    let result = StrategyRunner::new(
        broker(market),
        FixedWeights::new([("SPX", dec!(0.5))]),
        RunnerConfig::new("USD_CASH"),
    );

    assert!(matches!(
        result,
        Err(RunnerError::Broker(BrokerError::UnknownAccount(name))) if name == "USD_CASH"
    ));
}

#[test]
fn test_start_after_data_ends() {
    let market = Market::new(store(), vec![], "EUR", None).unwrap();
    let mut runner = StrategyRunner::new(
        broker(market),
        FixedWeights::new([("SPX", dec!(0.5))]),
        RunnerConfig::new("EUR_CASH"),
    )
    .unwrap();

    assert_eq!(runner.run(day(365), 10), Ok(0));
    assert_eq!(runner.broker().get_accounts()["SPX"].0, dec!(0));
}
