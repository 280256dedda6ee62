use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CurrencyCode, ExecutionType, OrderStatus, Side, TradingPair};
use crate::error::{OrderError, OrderResult};
use crate::values::{Amount, Price, Quantity, Timestamp, UserId};

/// Unique identifier for an order
pub type OrderId = Uuid;

/// Full order details
///
/// Invariants maintained by the mutating methods:
/// - `0 <= remaining_quantity <= quantity`
/// - `locked_funds >= 0`
/// - `Filled` iff nothing remains after at least one fill
/// - `Cancelled` implies `locked_funds == 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub pair: TradingPair,
    pub side: Side,
    pub execution_type: ExecutionType,
    /// Required for Limit orders, absent for Market orders
    pub limit_price: Option<Price>,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Funds reserved against this order, in `reservation_currency()`
    pub locked_funds: Amount,
    pub status: OrderStatus,
    /// Monotonic arrival number; breaks price ties in the book
    pub sequence: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Create a limit order with clock-provided time
    pub fn new_limit(
        user_id: UserId,
        pair: TradingPair,
        side: Side,
        quantity: Quantity,
        limit_price: Price,
        sequence: u64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            pair,
            side,
            execution_type: ExecutionType::Limit,
            limit_price: Some(limit_price),
            quantity,
            remaining_quantity: quantity,
            locked_funds: Decimal::ZERO,
            status: OrderStatus::Pending,
            sequence,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Create a market order with clock-provided time
    pub fn new_market(
        user_id: UserId,
        pair: TradingPair,
        side: Side,
        quantity: Quantity,
        sequence: u64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            pair,
            side,
            execution_type: ExecutionType::Market,
            limit_price: None,
            quantity,
            remaining_quantity: quantity,
            locked_funds: Decimal::ZERO,
            status: OrderStatus::Pending,
            sequence,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Validate the order based on execution type requirements
    pub fn validate(&self) -> OrderResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidOrder(
                "quantity must be greater than zero".to_string(),
            ));
        }

        match (self.execution_type, self.limit_price) {
            (ExecutionType::Limit, None) => Err(OrderError::InvalidOrder(
                "limit price required for LIMIT orders".to_string(),
            )),
            (ExecutionType::Limit, Some(price)) if price <= Decimal::ZERO => Err(
                OrderError::InvalidOrder("limit price must be greater than zero".to_string()),
            ),
            (ExecutionType::Limit, Some(price)) if price.checked_mul(self.quantity).is_none() => {
                Err(OrderError::InvalidOrder(format!(
                    "notional of {} x {} is out of range",
                    self.quantity, price
                )))
            }
            (ExecutionType::Market, Some(_)) => Err(OrderError::InvalidOrder(
                "MARKET orders do not take a limit price".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_market(&self) -> bool {
        self.execution_type == ExecutionType::Market
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Currency the locked funds are held in: quote for buys, base for sells
    pub fn reservation_currency(&self) -> &CurrencyCode {
        self.pair.reservation_currency(self.side)
    }

    /// `limit_price * quantity`; None for market orders and for products out
    /// of range, which `validate` rejects
    pub fn notional(&self) -> Option<Amount> {
        self.limit_price
            .and_then(|price| price.checked_mul(self.quantity))
    }

    /// Record the amount reserved at submission
    pub fn set_locked(&mut self, amount: Amount) {
        self.locked_funds = amount;
    }

    /// Spend part of the reservation on a fill
    pub fn consume_locked(&mut self, amount: Amount) -> OrderResult<()> {
        if amount < Decimal::ZERO || amount > self.locked_funds {
            return Err(OrderError::LockedFundsExhausted {
                order_id: self.id,
                locked: self.locked_funds,
                requested: amount,
            });
        }
        self.locked_funds -= amount;
        Ok(())
    }

    /// Zero the reservation and return what was left in it
    pub fn take_locked(&mut self) -> Amount {
        std::mem::replace(&mut self.locked_funds, Decimal::ZERO)
    }

    /// Apply a fill of `quantity`, moving the status to Partial or Filled
    pub fn fill(&mut self, quantity: Quantity, now: Timestamp) -> OrderResult<()> {
        if !self.status.is_open() {
            return Err(OrderError::InvalidTransition {
                order_id: self.id,
                from: self.status,
                to: OrderStatus::Partial,
            });
        }
        if quantity <= Decimal::ZERO || quantity > self.remaining_quantity {
            return Err(OrderError::NegativeRemaining {
                order_id: self.id,
                remaining: self.remaining_quantity,
                fill: quantity,
            });
        }

        self.remaining_quantity -= quantity;
        self.status = if self.remaining_quantity.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = now;
        Ok(())
    }

    /// Withdraw the order. Returns the locked amount that must be credited
    /// back to the owner's available balance.
    pub fn cancel(&mut self, now: Timestamp) -> OrderResult<Amount> {
        if !self.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(OrderError::InvalidTransition {
                order_id: self.id,
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(self.take_locked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        TradingPair::parse("BTC", "INR").unwrap()
    }

    fn limit_buy(qty: Decimal, price: Decimal) -> Order {
        Order::new_limit(
            Uuid::new_v4(),
            pair(),
            Side::Buy,
            qty,
            price,
            1,
            Utc::now(),
        )
    }

    #[test]
    fn test_validate() {
        assert!(limit_buy(dec!(1), dec!(100)).validate().is_ok());
        assert!(limit_buy(dec!(0), dec!(100)).validate().is_err());
        assert!(limit_buy(dec!(-1), dec!(100)).validate().is_err());
        assert!(limit_buy(dec!(1), dec!(0)).validate().is_err());

        let mut missing_price = limit_buy(dec!(1), dec!(100));
        missing_price.limit_price = None;
        assert!(missing_price.validate().is_err());

        let market = Order::new_market(Uuid::new_v4(), pair(), Side::Sell, dec!(2), 2, Utc::now());
        assert!(market.validate().is_ok());
        assert!(market.notional().is_none());
    }

    #[test]
    fn test_notional_out_of_range_is_invalid() {
        let huge = limit_buy(dec!(10000000000), dec!(100000000000000000000));
        assert!(huge.notional().is_none());
        assert!(matches!(huge.validate(), Err(OrderError::InvalidOrder(_))));
    }

    #[test]
    fn test_fill_transitions() {
        let mut order = limit_buy(dec!(2), dec!(100));
        let now = Utc::now();

        order.fill(dec!(1), now).unwrap();
        assert_eq!(order.status, OrderStatus::Partial);
        assert_eq!(order.remaining_quantity, dec!(1));
        assert_eq!(order.filled_quantity(), dec!(1));

        order.fill(dec!(1), now).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.remaining_quantity.is_zero());

        // No transitions leave Filled
        assert!(order.fill(dec!(1), now).is_err());
        assert!(order.cancel(now).is_err());
    }

    #[test]
    fn test_overfill_rejected() {
        let mut order = limit_buy(dec!(1), dec!(100));
        let err = order.fill(dec!(2), Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::NegativeRemaining { .. }));
        assert_eq!(order.remaining_quantity, dec!(1));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_locked_funds_accounting() {
        let mut order = limit_buy(dec!(1), dec!(100));
        order.set_locked(dec!(100));

        order.consume_locked(dec!(40)).unwrap();
        assert_eq!(order.locked_funds, dec!(60));
        assert!(order.consume_locked(dec!(61)).is_err());

        let released = order.cancel(Utc::now()).unwrap();
        assert_eq!(released, dec!(60));
        assert!(order.locked_funds.is_zero());
        assert_eq!(order.status, OrderStatus::Cancelled);
    }
}
