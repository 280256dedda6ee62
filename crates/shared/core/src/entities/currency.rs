use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OrderError;

/// Ticker of a currency, e.g. `BTC` or `INR`.
///
/// Always stored uppercase. Ordering is lexicographic, which is also the
/// global order in which balance rows are locked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(value: impl Into<String>) -> Result<Self, OrderError> {
        let s: String = value.into();
        if s.is_empty() {
            return Err(OrderError::InvalidOrder(
                "currency code cannot be empty".to_string(),
            ));
        }
        if s.len() > 10 {
            return Err(OrderError::InvalidOrder(format!(
                "currency code too long (max 10 chars): {}",
                s
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OrderError::InvalidOrder(format!(
                "currency code must be alphanumeric: {}",
                s
            )));
        }
        Ok(CurrencyCode(s.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = OrderError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CurrencyCode::new(value)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = OrderError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Currency reference data. Immutable as far as the engine is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: CurrencyCode,
    pub name: String,
    pub is_crypto: bool,
    pub active: bool,
}

impl Currency {
    /// Active crypto currency
    pub fn crypto(symbol: CurrencyCode, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
            is_crypto: true,
            active: true,
        }
    }

    /// Active fiat currency
    pub fn fiat(symbol: CurrencyCode, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
            is_crypto: false,
            active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}
