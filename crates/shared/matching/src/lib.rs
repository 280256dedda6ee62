//! Bourse Matching
//!
//! The per-pair order book and the price-time priority matching algorithm.

mod book;
mod price_time;

pub use book::{BookDepth, OrderBook, PriceLevel};
pub use price_time::PriceTimeMatcher;

// Re-export the trait from ports for convenience
pub use bourse_ports::{MatchProposal, MatchingAlgorithm, MatchingError, MatchingResult};
