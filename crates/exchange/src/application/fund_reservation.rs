use std::sync::Arc;

use bourse_core::{Amount, ExecutionType, FeeRates, LedgerEntry, Order, Side, Timestamp};
use bourse_ports::{BalanceRepository, LedgerError};
use log::{debug, info};
use rust_decimal::Decimal;

use crate::error::{ExchangeError, Result};

/// Locks funds when an order is submitted and releases them on cancellation
pub struct FundReservation {
    balances: Arc<dyn BalanceRepository>,
}

impl FundReservation {
    pub fn new(balances: Arc<dyn BalanceRepository>) -> Self {
        Self { balances }
    }

    /// Amount `order` must reserve, in its reservation currency
    ///
    /// - SELL: the quantity, in base
    /// - LIMIT BUY: `limit_price * quantity`, plus the pair's largest fee
    ///   fraction so the fee can be paid out of the reservation
    /// - MARKET BUY: the caller's spend ceiling
    pub fn required(order: &Order, rates: &FeeRates, max_spend: Option<Amount>) -> Result<Amount> {
        match (order.side, order.execution_type) {
            (Side::Sell, _) => Ok(order.quantity),
            (Side::Buy, ExecutionType::Limit) => {
                order
                    .notional()
                    .and_then(|notional| notional.checked_mul(Decimal::ONE + rates.headroom()))
                    .ok_or_else(|| {
                        ExchangeError::InvalidOrder(format!(
                            "reservation for {} x {:?} is out of range",
                            order.quantity, order.limit_price
                        ))
                    })
            }
            (Side::Buy, ExecutionType::Market) => max_spend
                .filter(|spend| *spend > Decimal::ZERO)
                .ok_or_else(|| {
                    ExchangeError::InvalidOrder(
                        "MARKET BUY orders need a positive spend ceiling".to_string(),
                    )
                }),
        }
    }

    /// Debit `required` from the owner's available balance and record it on
    /// the order. Nothing changes when the balance is too small.
    pub fn lock_funds(&self, order: &mut Order, required: Amount) -> Result<()> {
        let currency = order.reservation_currency().clone();
        let debit = LedgerEntry::debit(order.user_id, currency.clone(), required);

        match self.balances.apply(&[debit]) {
            Ok(()) => {
                order.set_locked(required);
                debug!("Locked {} {} for order {}", required, currency, order.id);
                Ok(())
            }
            Err(LedgerError::NegativeBalance { .. }) => Err(ExchangeError::InsufficientBalance {
                available: self.balances.available(order.user_id, &currency),
                currency,
                required,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Credit the order's locked funds back and mark it cancelled.
    ///
    /// Returns the updated order and the amount released. Terminal orders are
    /// returned unchanged with nothing released.
    pub fn release(&self, order: &Order, now: Timestamp) -> Result<(Order, Amount)> {
        if order.status.is_terminal() {
            return Ok((order.clone(), Decimal::ZERO));
        }

        let mut cancelled = order.clone();
        let released = cancelled.cancel(now)?;
        if released > Decimal::ZERO {
            self.balances.apply(&[LedgerEntry::credit(
                order.user_id,
                order.reservation_currency().clone(),
                released,
            )])?;
        }

        info!(
            "Released {} {} from order {}",
            released,
            order.reservation_currency(),
            order.id
        );
        Ok((cancelled, released))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryBalanceRepository;
    use bourse_core::{CurrencyCode, OrderStatus, TradingPair};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn pair() -> TradingPair {
        TradingPair::parse("BTC", "INR").unwrap()
    }

    fn inr() -> CurrencyCode {
        CurrencyCode::new("INR").unwrap()
    }

    fn funded(amount: Decimal) -> (Arc<InMemoryBalanceRepository>, Uuid) {
        let ledger = Arc::new(InMemoryBalanceRepository::default());
        let user = Uuid::new_v4();
        ledger
            .apply(&[LedgerEntry::credit(user, inr(), amount)])
            .unwrap();
        (ledger, user)
    }

    #[test]
    fn test_required_amounts() {
        let user = Uuid::new_v4();
        let rates = FeeRates {
            maker: dec!(0.001),
            taker: dec!(0.002),
        };
        let buy = Order::new_limit(user, pair(), Side::Buy, dec!(2), dec!(500), 1, Utc::now());
        let sell = Order::new_limit(user, pair(), Side::Sell, dec!(2), dec!(500), 2, Utc::now());
        let market_buy = Order::new_market(user, pair(), Side::Buy, dec!(2), 3, Utc::now());

        assert_eq!(
            FundReservation::required(&buy, &FeeRates::zero(), None).unwrap(),
            dec!(1000)
        );
        assert_eq!(
            FundReservation::required(&buy, &rates, None).unwrap(),
            dec!(1002)
        );
        assert_eq!(
            FundReservation::required(&sell, &rates, None).unwrap(),
            dec!(2)
        );
        assert_eq!(
            FundReservation::required(&market_buy, &rates, Some(dec!(750))).unwrap(),
            dec!(750)
        );
        assert!(FundReservation::required(&market_buy, &rates, None).is_err());
    }

    #[test]
    fn test_fee_headroom_out_of_range_is_invalid() {
        let rates = FeeRates {
            maker: dec!(0.001),
            taker: dec!(0.002),
        };
        let buy = Order::new_limit(Uuid::new_v4(), pair(), Side::Buy, dec!(1), Decimal::MAX, 1, Utc::now());

        assert_eq!(
            FundReservation::required(&buy, &FeeRates::zero(), None).unwrap(),
            Decimal::MAX
        );
        assert!(matches!(
            FundReservation::required(&buy, &rates, None),
            Err(ExchangeError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_lock_funds() {
        let (ledger, user) = funded(dec!(100));
        let reservation = FundReservation::new(ledger.clone());
        let mut order = Order::new_limit(user, pair(), Side::Buy, dec!(1), dec!(60), 1, Utc::now());

        reservation.lock_funds(&mut order, dec!(60)).unwrap();
        assert_eq!(order.locked_funds, dec!(60));
        assert_eq!(ledger.available(user, &inr()), dec!(40));
    }

    #[test]
    fn test_insufficient_balance_changes_nothing() {
        let (ledger, user) = funded(dec!(100));
        let reservation = FundReservation::new(ledger.clone());
        let mut order = Order::new_limit(user, pair(), Side::Buy, dec!(2), dec!(60), 1, Utc::now());

        let err = reservation.lock_funds(&mut order, dec!(120)).unwrap_err();
        assert_eq!(
            err,
            ExchangeError::InsufficientBalance {
                currency: inr(),
                required: dec!(120),
                available: dec!(100),
            }
        );
        assert!(order.locked_funds.is_zero());
        assert_eq!(ledger.available(user, &inr()), dec!(100));
    }

    #[test]
    fn test_release_is_idempotent() {
        let (ledger, user) = funded(dec!(50));
        let reservation = FundReservation::new(ledger.clone());
        let mut order = Order::new_limit(user, pair(), Side::Buy, dec!(1), dec!(50), 1, Utc::now());
        reservation.lock_funds(&mut order, dec!(50)).unwrap();
        assert!(ledger.available(user, &inr()).is_zero());

        let (cancelled, released) = reservation.release(&order, Utc::now()).unwrap();
        assert_eq!(released, dec!(50));
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(cancelled.locked_funds.is_zero());
        assert_eq!(ledger.available(user, &inr()), dec!(50));

        let (again, released) = reservation.release(&cancelled, Utc::now()).unwrap();
        assert!(released.is_zero());
        assert_eq!(again, cancelled);
        assert_eq!(ledger.available(user, &inr()), dec!(50));
    }
}
