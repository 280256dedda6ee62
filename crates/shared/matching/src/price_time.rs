use bourse_core::{Order, Price, Side};
use bourse_ports::{MatchProposal, MatchingAlgorithm, MatchingError, MatchingResult};
use rust_decimal::Decimal;

/// Standard price-time priority matching (FIFO)
///
/// Orders are matched based on:
/// 1. Best price (highest bid, lowest ask)
/// 2. Time priority (first in, first out at same price)
///
/// The resting (older) order is the maker and its limit price is the trade
/// price. A market maker defers to the taker's limit price; two market
/// orders trade at the pair's last price.
#[derive(Debug, Default)]
pub struct PriceTimeMatcher;

impl PriceTimeMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimeMatcher {
    fn name(&self) -> &str {
        "Price-Time Priority"
    }

    fn can_match(&self, buy_order: &Order, sell_order: &Order) -> bool {
        // Must be same pair
        if buy_order.pair != sell_order.pair {
            return false;
        }

        // Must be opposite sides
        if buy_order.side != Side::Buy || sell_order.side != Side::Sell {
            return false;
        }

        if !buy_order.is_open() || !sell_order.is_open() {
            return false;
        }

        // Check price conditions
        match (buy_order.limit_price, sell_order.limit_price) {
            // Both are limit orders - price must cross
            (Some(buy_price), Some(sell_price)) => buy_price >= sell_price,
            // At least one is a market order - can match
            _ => true,
        }
    }

    fn match_orders(
        &self,
        buy_order: &Order,
        sell_order: &Order,
        last_price: Option<Price>,
    ) -> MatchingResult<MatchProposal> {
        if !self.can_match(buy_order, sell_order) {
            return Err(MatchingError::CannotMatch(format!(
                "{} and {} do not cross",
                buy_order.id, sell_order.id
            )));
        }

        let quantity = buy_order
            .remaining_quantity
            .min(sell_order.remaining_quantity);
        if quantity <= Decimal::ZERO {
            return Err(MatchingError::NoQuantity);
        }

        let (maker, taker) = if buy_order.sequence < sell_order.sequence {
            (buy_order, sell_order)
        } else {
            (sell_order, buy_order)
        };

        let price = maker
            .limit_price
            .or(taker.limit_price)
            .or(last_price)
            .ok_or(MatchingError::NoPriceAvailable)?;

        Ok(MatchProposal {
            price,
            quantity,
            maker_side: maker.side,
        })
    }
}
