use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Monetary amount in a single currency (balances, locked funds, fees)
pub type Amount = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Identifier of an account holder. Authentication lives outside the engine,
/// so a user is only ever referenced by this id.
pub type UserId = Uuid;
