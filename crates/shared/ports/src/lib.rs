//! Bourse Ports
//!
//! Port definitions (traits) for the Bourse matching engine.
//! These define the boundaries between domain logic and infrastructure.
//!
//! All ports are synchronous: a matching pass runs to completion without
//! suspending, so nothing it calls may await.

mod clock;
mod error;
mod events;
mod ledger;
mod matching;
mod repository;

pub use clock::Clock;
pub use error::{LedgerError, LedgerResult, MatchingError, MatchingResult};
pub use events::EventSink;
pub use ledger::BalanceRepository;
pub use matching::{MatchProposal, MatchingAlgorithm};
pub use repository::{
    CurrencyRepository, FeeScheduleRepository, OrderRepository, PriceRepository, TradeRepository,
};
