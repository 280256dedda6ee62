use serde::{Deserialize, Serialize};

use super::TradingPair;
use crate::values::{Price, Timestamp};

/// Most recent trade price for a pair. One row per pair, upserted per trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTradedPrice {
    pub pair: TradingPair,
    pub price: Price,
    pub updated_at: Timestamp,
}

impl LastTradedPrice {
    pub fn new(pair: TradingPair, price: Price, updated_at: Timestamp) -> Self {
        Self {
            pair,
            price,
            updated_at,
        }
    }
}
