use std::sync::Arc;

use bourse_core::{FeeRates, FeeSchedule, TradingPair};
use bourse_ports::FeeScheduleRepository;
use log::debug;

/// Resolves maker/taker fractions for a pair
///
/// A missing or inactive schedule is not an error; fees default to zero.
pub struct FeeScheduleLookup {
    schedules: Arc<dyn FeeScheduleRepository>,
}

impl FeeScheduleLookup {
    pub fn new(schedules: Arc<dyn FeeScheduleRepository>) -> Self {
        Self { schedules }
    }

    pub fn resolve(&self, pair: &TradingPair) -> FeeRates {
        match self.schedules.active_for(pair) {
            Some(schedule) if schedule.active => {
                let rates = schedule.rates();
                debug!(
                    "Fees for {}: maker={} taker={}",
                    pair, rates.maker, rates.taker
                );
                rates
            }
            _ => {
                debug!("No active fee schedule for {}, fees are zero", pair);
                FeeRates::zero()
            }
        }
    }

    /// The active schedule, if any
    pub fn schedule(&self, pair: &TradingPair) -> Option<FeeSchedule> {
        self.schedules.active_for(pair).filter(|s| s.active)
    }

    /// Replace the pair's schedule
    pub fn set(&self, schedule: FeeSchedule) {
        self.schedules.upsert(schedule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryFeeScheduleRepository;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_defaults_to_zero() {
        let lookup = FeeScheduleLookup::new(Arc::new(InMemoryFeeScheduleRepository::new()));
        let pair = TradingPair::parse("BTC", "INR").unwrap();

        assert_eq!(lookup.resolve(&pair), FeeRates::zero());
        assert!(lookup.schedule(&pair).is_none());
    }

    #[test]
    fn test_resolve_active_schedule() {
        let lookup = FeeScheduleLookup::new(Arc::new(InMemoryFeeScheduleRepository::new()));
        let pair = TradingPair::parse("BTC", "INR").unwrap();
        let schedule = FeeSchedule::from_percent(pair.clone(), dec!(0.1), dec!(0.2)).unwrap();

        lookup.set(schedule.clone());
        let rates = lookup.resolve(&pair);
        assert_eq!(rates.maker, dec!(0.001));
        assert_eq!(rates.taker, dec!(0.002));

        // Replacing with an inactive row turns fees off
        lookup.set(schedule.deactivated());
        assert_eq!(lookup.resolve(&pair), FeeRates::zero());
    }
}
