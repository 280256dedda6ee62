use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradingPair;
use crate::error::OrderError;
use crate::values::Amount;

/// Which side of a match an order was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidityRole {
    /// Resting order, already in the book
    Maker,
    /// Order that crossed the book and triggered the match
    Taker,
}

/// Fee structure for a trading pair
///
/// Fractions, not percent: `0.001` is 0.1%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub pair: TradingPair,
    pub maker_fee_fraction: Decimal,
    pub taker_fee_fraction: Decimal,
    pub active: bool,
}

impl FeeSchedule {
    /// Create an active fee schedule, validating both fractions lie in `[0, 1)`
    pub fn new(
        pair: TradingPair,
        maker_fee_fraction: Decimal,
        taker_fee_fraction: Decimal,
    ) -> Result<Self, OrderError> {
        for (label, fraction) in [("maker", maker_fee_fraction), ("taker", taker_fee_fraction)] {
            if fraction < Decimal::ZERO || fraction >= Decimal::ONE {
                return Err(OrderError::InvalidOrder(format!(
                    "{} fee fraction must be in [0, 1): {}",
                    label, fraction
                )));
            }
        }
        Ok(Self {
            pair,
            maker_fee_fraction,
            taker_fee_fraction,
            active: true,
        })
    }

    /// Create from percentages, e.g. `0.1` maker and `0.2` taker
    pub fn from_percent(
        pair: TradingPair,
        maker_percent: Decimal,
        taker_percent: Decimal,
    ) -> Result<Self, OrderError> {
        let hundred = Decimal::ONE_HUNDRED;
        Self::new(pair, maker_percent / hundred, taker_percent / hundred)
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn rates(&self) -> FeeRates {
        FeeRates {
            maker: self.maker_fee_fraction,
            taker: self.taker_fee_fraction,
        }
    }
}

/// Resolved maker/taker fractions for a pair. Zero when no schedule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeRates {
    pub maker: Decimal,
    pub taker: Decimal,
}

impl FeeRates {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn rate(&self, role: LiquidityRole) -> Decimal {
        match role {
            LiquidityRole::Maker => self.maker,
            LiquidityRole::Taker => self.taker,
        }
    }

    /// Fee owed on `trade_value` for `role`, None if it is out of range
    pub fn fee(&self, trade_value: Amount, role: LiquidityRole) -> Option<Amount> {
        trade_value.checked_mul(self.rate(role))
    }

    /// Largest fraction either role can be charged; reserved on top of a
    /// buy order's notional
    pub fn headroom(&self) -> Decimal {
        self.maker.max(self.taker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        TradingPair::parse("BTC", "INR").unwrap()
    }

    #[test]
    fn test_from_percent() {
        let schedule = FeeSchedule::from_percent(pair(), dec!(0.1), dec!(0.2)).unwrap();
        assert_eq!(schedule.maker_fee_fraction, dec!(0.001));
        assert_eq!(schedule.taker_fee_fraction, dec!(0.002));
        assert!(schedule.active);
    }

    #[test]
    fn test_fee_calculation() {
        let rates = FeeSchedule::from_percent(pair(), dec!(0.1), dec!(0.2))
            .unwrap()
            .rates();

        // Maker fee: 1000 * 0.001 = 1
        assert_eq!(rates.fee(dec!(1000), LiquidityRole::Maker), Some(dec!(1)));
        // Taker fee: 1000 * 0.002 = 2
        assert_eq!(rates.fee(dec!(1000), LiquidityRole::Taker), Some(dec!(2)));
        assert_eq!(rates.headroom(), dec!(0.002));
    }

    #[test]
    fn test_zero_default() {
        let rates = FeeRates::default();
        assert_eq!(rates.fee(dec!(1000), LiquidityRole::Taker), Some(Decimal::ZERO));
        assert_eq!(rates.headroom(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(FeeSchedule::new(pair(), dec!(-0.001), dec!(0.001)).is_err());
        assert!(FeeSchedule::new(pair(), dec!(0.001), dec!(1)).is_err());
        assert!(FeeSchedule::from_percent(pair(), dec!(100), dec!(0)).is_err());
    }
}
