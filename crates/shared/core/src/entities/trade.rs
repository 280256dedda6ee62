use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderId, TradingPair};
use crate::values::{Amount, Price, Quantity, Timestamp, UserId};

/// Unique identifier for a trade
pub type TradeId = Uuid;

/// Trade resulting from matching orders
///
/// Orders are referenced by id only; a trade stays valid after its orders
/// are archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub pair: TradingPair,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer: UserId,
    pub seller: UserId,
    pub price: Price,
    pub quantity: Quantity,
    /// Fee charged to the buyer, in quote currency
    pub fee_buyer: Amount,
    /// Fee charged to the seller, in quote currency
    pub fee_seller: Amount,
    /// Whether the buy order was the resting side
    pub buyer_is_maker: bool,
    pub traded_at: Timestamp,
}

impl Trade {
    /// Create a fee-free trade with clock-provided time
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pair: TradingPair,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer: UserId,
        seller: UserId,
        price: Price,
        quantity: Quantity,
        traded_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair,
            buy_order_id,
            sell_order_id,
            buyer,
            seller,
            price,
            quantity,
            fee_buyer: Decimal::ZERO,
            fee_seller: Decimal::ZERO,
            buyer_is_maker: false,
            traded_at,
        }
    }

    /// Set fees on a new trade
    pub fn with_fees(mut self, fee_buyer: Amount, fee_seller: Amount, buyer_is_maker: bool) -> Self {
        self.fee_buyer = fee_buyer;
        self.fee_seller = fee_seller;
        self.buyer_is_maker = buyer_is_maker;
        self
    }

    /// Returns the notional value of the trade (price * quantity)
    ///
    /// Settlement only records trades whose value fits, so this never
    /// saturates for trades the engine produced.
    pub fn value(&self) -> Amount {
        self.price.saturating_mul(self.quantity)
    }

    /// Get total fees collected
    pub fn total_fees(&self) -> Amount {
        self.fee_buyer.saturating_add(self.fee_seller)
    }

    pub fn involves(&self, order_id: OrderId) -> bool {
        self.buy_order_id == order_id || self.sell_order_id == order_id
    }
}
