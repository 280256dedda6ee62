use bourse_core::{Order, Price, Quantity, Side};

use crate::error::MatchingResult;

/// Outcome of pricing one match between the best bid and best ask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchProposal {
    pub price: Price,
    pub quantity: Quantity,
    /// Side of the resting order; its counterpart is the taker
    pub maker_side: Side,
}

impl MatchProposal {
    pub fn buyer_is_maker(&self) -> bool {
        self.maker_side == Side::Buy
    }
}

/// Port for order matching algorithms
///
/// Implementations decide whether the top of book crosses and at what price
/// the match executes. Fund settlement is not their concern.
pub trait MatchingAlgorithm: Send + Sync {
    /// Check if two orders can match
    fn can_match(&self, buy_order: &Order, sell_order: &Order) -> bool;

    /// Price and size the match between `buy_order` and `sell_order`.
    ///
    /// `last_price` is the pair's last traded price, used when neither order
    /// carries a limit price.
    fn match_orders(
        &self,
        buy_order: &Order,
        sell_order: &Order,
        last_price: Option<Price>,
    ) -> MatchingResult<MatchProposal>;

    /// Get the name of the algorithm
    fn name(&self) -> &str;
}
