mod exchange;
mod fee_lookup;
mod fund_reservation;
mod matching_engine;
mod settlement;
mod trade_recorder;

pub use exchange::{CancelAck, Exchange, Repositories, SubmitOrderCommand, SubmitOrderResult};
pub use fee_lookup::FeeScheduleLookup;
pub use fund_reservation::FundReservation;
pub use matching_engine::{MatchingEngine, PassOutcome};
pub use settlement::{LedgerJournal, settle};
pub use trade_recorder::TradeRecorder;
