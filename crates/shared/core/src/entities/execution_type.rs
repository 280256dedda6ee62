use serde::{Deserialize, Serialize};

/// How an order is executed against the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    /// Execute at the specified price or better; the remainder rests in the book
    Limit,
    /// Execute immediately against resting liquidity; the remainder is cancelled
    Market,
}

impl ExecutionType {
    pub fn requires_price(&self) -> bool {
        matches!(self, ExecutionType::Limit)
    }

    /// Market orders never rest (immediate-or-cancel)
    pub fn is_immediate_or_cancel(&self) -> bool {
        matches!(self, ExecutionType::Market)
    }
}
