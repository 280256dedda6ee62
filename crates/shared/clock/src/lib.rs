//! Bourse Clock Infrastructure
//!
//! Time sources for the engine:
//!
//! - [`SystemClock`] returns wall-clock time, for production.
//! - [`ManualClock`] only moves when told to, for deterministic tests.
//!
//! ## Usage
//!
//! ```ignore
//! use bourse_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(start);
//! let t0 = clock.now();
//! clock.advance(Duration::seconds(5));
//! assert_eq!(clock.now() - t0, Duration::seconds(5));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use bourse_ports::Clock;
