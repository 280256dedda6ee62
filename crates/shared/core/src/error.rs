use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::OrderStatus;

/// Violations of the order invariants
///
/// Raised by the entity methods that mutate an order; the engine treats any
/// of them during a matching pass as a ledger invariant violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Order {order_id}: fill of {fill} exceeds remaining quantity {remaining}")]
    NegativeRemaining {
        order_id: Uuid,
        remaining: Decimal,
        fill: Decimal,
    },

    #[error("Order {order_id}: consuming {requested} exceeds locked funds {locked}")]
    LockedFundsExhausted {
        order_id: Uuid,
        locked: Decimal,
        requested: Decimal,
    },

    #[error("Amount out of range: {0}")]
    Overflow(String),

    #[error("Order {order_id}: invalid transition {from} -> {to}")]
    InvalidTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },
}

pub type OrderResult<T> = std::result::Result<T, OrderError>;
