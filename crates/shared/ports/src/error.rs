use bourse_core::{Amount, BalanceKey, CurrencyCode, OrderId, OrderStatus, TradingPair, UserId};
use thiserror::Error;

/// Domain-level errors for matching operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Orders cannot match: {0}")]
    CannotMatch(String),

    #[error("No quantity to match")]
    NoQuantity,

    #[error("Price unavailable for market order")]
    NoPriceAvailable,

    #[error("Order {order_id} belongs to {actual}, not {expected}")]
    PairMismatch {
        order_id: OrderId,
        expected: TradingPair,
        actual: TradingPair,
    },

    #[error("Order {0} is already in the book")]
    DuplicateOrder(OrderId),

    #[error("Limit order {0} has no price")]
    MissingPrice(OrderId),

    #[error("Order {order_id} is {status}, only open orders can rest in the book")]
    OrderNotOpen {
        order_id: OrderId,
        status: OrderStatus,
    },
}

pub type MatchingResult<T> = std::result::Result<T, MatchingError>;

/// Errors raised by the balance ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Applying the batch would leave a row below zero; nothing was written
    #[error("Balance of {currency} for user {user} would become {balance}")]
    NegativeBalance {
        user: UserId,
        currency: CurrencyCode,
        balance: Amount,
    },

    /// Applying the batch would push a row past the largest representable
    /// amount; nothing was written
    #[error("Balance of {currency} for user {user} is out of range")]
    Overflow { user: UserId, currency: CurrencyCode },

    #[error("Could not lock {resource} within the retry budget")]
    LockContention { resource: String },
}

impl LedgerError {
    pub fn negative(key: &BalanceKey, balance: Amount) -> Self {
        LedgerError::NegativeBalance {
            user: key.user,
            currency: key.currency.clone(),
            balance,
        }
    }

    pub fn overflow(key: &BalanceKey) -> Self {
        LedgerError::Overflow {
            user: key.user,
            currency: key.currency.clone(),
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
