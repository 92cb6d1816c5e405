use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const BPS_PER_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// How a transaction cost is derived from the transferred value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeModel {
    /// Flat fee per charged transfer, in the fee account's currency
    Fixed { amount: Decimal },
    /// Basis points of the transferred value, with an optional floor
    Proportional {
        bps: Decimal,
        #[serde(default)]
        min_fee: Decimal,
    },
}

impl FeeModel {
    pub fn fixed(amount: Decimal) -> Self {
        FeeModel::Fixed { amount }
    }

    pub fn bps(bps: Decimal) -> Self {
        FeeModel::Proportional {
            bps,
            min_fee: Decimal::ZERO,
        }
    }

    /// Whether the fee depends on the transferred value
    pub fn is_proportional(&self) -> bool {
        matches!(self, FeeModel::Proportional { .. })
    }

    /// Fee for a transfer worth `value` (fee currency); sign of `value` is ignored
    pub fn calculate_fee(&self, value: Decimal) -> Decimal {
        match self {
            FeeModel::Fixed { amount } => *amount,
            FeeModel::Proportional { bps, min_fee } => {
                let fee = value.abs() * *bps / BPS_PER_UNIT;
                fee.max(*min_fee)
            }
        }
    }
}
