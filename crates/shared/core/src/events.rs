use serde::{Deserialize, Serialize};

use crate::entities::{LastTradedPrice, Order, OrderId, OrderStatus, Trade, TradingPair};
use crate::values::{Amount, Quantity, Timestamp};

/// Observable facts produced by the engine, published after a pass commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// Funds locked and order placed in the book
    OrderAccepted { order: Order },
    TradeExecuted { trade: Trade },
    /// Fill applied to an order
    OrderUpdated {
        order_id: OrderId,
        pair: TradingPair,
        status: OrderStatus,
        remaining_quantity: Quantity,
        locked_funds: Amount,
        timestamp: Timestamp,
    },
    /// Order withdrawn, either on request or as an unmatched market remainder
    OrderCancelled {
        order_id: OrderId,
        pair: TradingPair,
        released: Amount,
        timestamp: Timestamp,
    },
    LastPriceUpdated { price: LastTradedPrice },
}

impl ExchangeEvent {
    pub fn order_updated(order: &Order) -> Self {
        ExchangeEvent::OrderUpdated {
            order_id: order.id,
            pair: order.pair.clone(),
            status: order.status,
            remaining_quantity: order.remaining_quantity,
            locked_funds: order.locked_funds,
            timestamp: order.updated_at,
        }
    }

    /// Trading pair the event belongs to; used for per-pair routing
    pub fn pair(&self) -> &TradingPair {
        match self {
            ExchangeEvent::OrderAccepted { order } => &order.pair,
            ExchangeEvent::TradeExecuted { trade } => &trade.pair,
            ExchangeEvent::OrderUpdated { pair, .. } => pair,
            ExchangeEvent::OrderCancelled { pair, .. } => pair,
            ExchangeEvent::LastPriceUpdated { price } => &price.pair,
        }
    }
}
