use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CurrencyCode, Side};
use crate::error::OrderError;

/// A spot trading pair: `base` is bought/sold, `quote` prices it (BTC/INR).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl TradingPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// Parse from plain tickers, e.g. `TradingPair::parse("BTC", "INR")`
    pub fn parse(base: &str, quote: &str) -> Result<Self, OrderError> {
        Ok(Self::new(CurrencyCode::new(base)?, CurrencyCode::new(quote)?))
    }

    /// Currency an order on `side` must reserve: quote for buys, base for sells
    pub fn reservation_currency(&self, side: Side) -> &CurrencyCode {
        match side {
            Side::Buy => &self.quote,
            Side::Sell => &self.base,
        }
    }

    /// Currency an order on `side` receives when filled
    pub fn proceeds_currency(&self, side: Side) -> &CurrencyCode {
        match side {
            Side::Buy => &self.base,
            Side::Sell => &self.quote,
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_currency() {
        let pair = TradingPair::parse("BTC", "INR").unwrap();
        assert_eq!(pair.reservation_currency(Side::Buy).as_str(), "INR");
        assert_eq!(pair.reservation_currency(Side::Sell).as_str(), "BTC");
        assert_eq!(pair.proceeds_currency(Side::Buy).as_str(), "BTC");
        assert_eq!(pair.to_string(), "BTC/INR");
    }
}
