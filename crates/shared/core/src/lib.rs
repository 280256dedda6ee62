//! Bourse Core Domain
//!
//! Pure domain types for the Bourse spot matching engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod events;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Ledger types
    Balance,
    BalanceKey,
    // Reference data
    Currency,
    CurrencyCode,
    // Core trading entities
    ExecutionType,
    // Fee types
    FeeRates,
    FeeSchedule,
    LastTradedPrice,
    LedgerEntry,
    LiquidityRole,
    Order,
    OrderId,
    OrderStatus,
    Side,
    Trade,
    TradeId,
    TradingPair,
};
pub use error::{OrderError, OrderResult};
pub use events::ExchangeEvent;
pub use values::{Amount, Price, Quantity, Timestamp, UserId};
