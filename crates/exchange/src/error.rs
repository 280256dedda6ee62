use bourse_core::{Amount, CurrencyCode, OrderError, OrderId};
use bourse_ports::{LedgerError, MatchingError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// Rejected before any state change
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Insufficient {currency} balance: required {required}, available {available}")]
    InsufficientBalance {
        currency: CurrencyCode,
        required: Amount,
        available: Amount,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transient: the retry budget for a lock ran out
    #[error("Lock contention on {resource}")]
    LockContention { resource: String },

    /// Fatal for the pass that raised it; nothing from that pass was committed
    #[error("Ledger invariant violation: {0}")]
    LedgerInvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

impl ExchangeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ExchangeError::LockContention { .. })
    }
}

impl From<OrderError> for ExchangeError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidOrder(msg) => ExchangeError::InvalidOrder(msg),
            OrderError::InvalidTransition { .. } => ExchangeError::InvalidState(err.to_string()),
            other => ExchangeError::LedgerInvariantViolation(other.to_string()),
        }
    }
}

impl From<LedgerError> for ExchangeError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::LockContention { resource } => ExchangeError::LockContention { resource },
            other @ (LedgerError::NegativeBalance { .. } | LedgerError::Overflow { .. }) => {
                ExchangeError::LedgerInvariantViolation(other.to_string())
            }
        }
    }
}

impl From<MatchingError> for ExchangeError {
    fn from(err: MatchingError) -> Self {
        ExchangeError::LedgerInvariantViolation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_ledger_error_mapping() {
        let contention: ExchangeError = LedgerError::LockContention {
            resource: "book BTC/INR".to_string(),
        }
        .into();
        assert!(contention.is_transient());

        let negative: ExchangeError = LedgerError::NegativeBalance {
            user: Uuid::new_v4(),
            currency: CurrencyCode::new("INR").unwrap(),
            balance: dec!(-1),
        }
        .into();
        assert!(matches!(
            negative,
            ExchangeError::LedgerInvariantViolation(_)
        ));
        assert!(!negative.is_transient());
    }
}
