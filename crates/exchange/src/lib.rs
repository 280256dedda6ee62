//! Bourse Exchange
//!
//! A continuous double-auction matching engine for spot trading pairs.
//!
//! ## Flow
//!
//! ```text
//! submit_order
//!     │
//!     ├── FundReservation   lock funds (fails the submission if short)
//!     ├── OrderBook         insert under the pair's exclusive section
//!     ├── MatchingEngine    match best bid vs best ask in place, keeping an undo log
//!     │       └── settle    fees, reservation consumption, journal
//!     └── commit            ledger batch → orders → trades/price → events
//!                           (any failure: undo the pass, withdraw the order)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use bourse_exchange::{Exchange, SubmitOrderCommand, SystemClock};
//!
//! let exchange = Exchange::in_memory(Arc::new(SystemClock::new()));
//! exchange.register_currency(Currency::crypto(btc.clone(), "Bitcoin"));
//! exchange.register_currency(Currency::fiat(inr.clone(), "Indian Rupee"));
//! exchange.deposit(alice, &inr, dec!(1000))?;
//!
//! let result = exchange.submit_order(SubmitOrderCommand::limit(
//!     alice, pair, Side::Buy, dec!(1), dec!(100),
//! ))?;
//! ```

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod locking;

// Re-export main types for convenience
pub use application::{
    CancelAck, Exchange, FeeScheduleLookup, FundReservation, LedgerJournal, MatchingEngine,
    PassOutcome, Repositories, SubmitOrderCommand, SubmitOrderResult, TradeRecorder,
};
pub use bourse_clock::{Clock, ManualClock, SystemClock};
pub use bourse_matching::{BookDepth, PriceLevel};
pub use config::{ConfigError, ExchangeConfig, LockingConfig};
pub use error::{ExchangeError, Result};
pub use locking::RetryPolicy;
