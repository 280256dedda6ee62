use std::sync::Arc;

use bourse_core::{LastTradedPrice, OrderId, Trade, TradingPair};
use bourse_ports::{PriceRepository, TradeRepository};

/// Immutable trade log plus the last-traded-price cache per pair
pub struct TradeRecorder {
    trades: Arc<dyn TradeRepository>,
    prices: Arc<dyn PriceRepository>,
}

impl TradeRecorder {
    pub fn new(trades: Arc<dyn TradeRepository>, prices: Arc<dyn PriceRepository>) -> Self {
        Self { trades, prices }
    }

    /// Append each trade and move the pair's last price to it
    pub fn record(&self, trades: &[Trade]) {
        for trade in trades {
            self.trades.append(trade.clone());
            self.prices.upsert(LastTradedPrice::new(
                trade.pair.clone(),
                trade.price,
                trade.traded_at,
            ));
        }
    }

    pub fn last_price(&self, pair: &TradingPair) -> Option<LastTradedPrice> {
        self.prices.get(pair)
    }

    pub fn trades_for_pair(&self, pair: &TradingPair) -> Vec<Trade> {
        self.trades.by_pair(pair)
    }

    pub fn trades_for_order(&self, order_id: OrderId) -> Vec<Trade> {
        self.trades.by_order(order_id)
    }
}
