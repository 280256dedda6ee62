use std::sync::Arc;

use bourse_core::Timestamp;
use bourse_ports::Clock;
use chrono::Utc;

/// Wall clock; every order, trade and price timestamp reads UTC now.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Ready to hand to the exchange
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_wall_time() {
        let clock = SystemClock::shared();
        let before = Utc::now();
        let now = clock.now();
        let after = Utc::now();

        assert!(before <= now && now <= after);
        assert_eq!(clock.name(), "SystemClock");
    }
}
