use std::fmt::Display;
use std::time::Duration;

use bourse_ports::{LedgerError, LedgerResult};
use log::warn;
use parking_lot::{Mutex, MutexGuard};

use crate::config::LockingConfig;

/// Bounded retry with exponential backoff for lock acquisition
///
/// Shared by the per-pair book sections and the per-balance row locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub acquire_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LockingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            acquire_timeout: Duration::from_millis(config.acquire_timeout_ms),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Acquire `mutex`, giving up with `LockContention` once every attempt
    /// has timed out.
    pub fn lock<'a, T>(
        &self,
        mutex: &'a Mutex<T>,
        resource: impl Display,
    ) -> LedgerResult<MutexGuard<'a, T>> {
        let mut backoff = self.initial_backoff;

        for attempt in 1..=self.max_attempts {
            if let Some(guard) = mutex.try_lock_for(self.acquire_timeout) {
                return Ok(guard);
            }
            warn!(
                "Lock contention on {} (attempt {}/{})",
                resource, attempt, self.max_attempts
            );
            if attempt < self.max_attempts {
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.max_backoff);
            }
        }

        Err(LedgerError::LockContention {
            resource: resource.to_string(),
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LockingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            acquire_timeout: Duration::from_millis(1),
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_uncontended_lock() {
        let mutex = Mutex::new(5);
        let guard = fast_policy(1).lock(&mutex, "counter").unwrap();
        assert_eq!(*guard, 5);
    }

    #[test]
    fn test_contention_exhausts_retries() {
        let mutex = Mutex::new(());
        let _held = mutex.lock();

        let err = fast_policy(3).lock(&mutex, "book BTC/INR").unwrap_err();
        assert_eq!(
            err,
            LedgerError::LockContention {
                resource: "book BTC/INR".to_string()
            }
        );
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let config = LockingConfig {
            max_attempts: 0,
            ..LockingConfig::default()
        };
        assert_eq!(RetryPolicy::from_config(&config).max_attempts, 1);
    }
}
