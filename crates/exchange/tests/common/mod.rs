//! Test doubles shared by the integration and concurrency tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bourse_core::{Amount, Balance, Currency, CurrencyCode, LedgerEntry, UserId};
use bourse_exchange::infrastructure::InMemoryBalanceRepository;
use bourse_exchange::{Exchange, ExchangeConfig, ManualClock, Repositories, RetryPolicy};
use bourse_ports::{BalanceRepository, LedgerError, LedgerResult};
use rust_decimal_macros::dec;

/// In-memory ledger that can be told to reject settlement batches
///
/// Only batches with more than one entry fail; deposits, reservations and
/// releases always go through.
pub struct FailingLedger {
    inner: InMemoryBalanceRepository,
    every: AtomicUsize,
    seen: AtomicUsize,
    failures: AtomicUsize,
}

impl FailingLedger {
    pub fn new(policy: RetryPolicy) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBalanceRepository::new(policy),
            every: AtomicUsize::new(0),
            seen: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    /// Reject every `n`th settlement batch; 0 turns failures off
    pub fn fail_every(&self, n: usize) {
        self.every.store(n, Ordering::SeqCst);
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl BalanceRepository for FailingLedger {
    fn available(&self, user: UserId, currency: &CurrencyCode) -> Amount {
        self.inner.available(user, currency)
    }

    fn balances_for(&self, user: UserId) -> Vec<Balance> {
        self.inner.balances_for(user)
    }

    fn apply(&self, entries: &[LedgerEntry]) -> LedgerResult<()> {
        let every = self.every.load(Ordering::SeqCst);
        if entries.len() > 1 && every > 0 {
            let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
            if seen % every == 0 {
                self.failures.fetch_add(1, Ordering::SeqCst);
                return Err(LedgerError::negative(&entries[0].key, dec!(-1)));
            }
        }
        self.inner.apply(entries)
    }
}

/// Exchange over `ledger` with BTC, ETH and INR registered and no fees
pub fn exchange_with_ledger(ledger: Arc<FailingLedger>, config: &ExchangeConfig) -> Exchange {
    let _ = env_logger::try_init();
    let mut repos = Repositories::in_memory(RetryPolicy::from_config(&config.locking));
    repos.balances = ledger;
    let exchange = Exchange::new(config, ManualClock::starting_now(), repos);
    exchange.register_currency(Currency::crypto(CurrencyCode::new("BTC").unwrap(), "Bitcoin"));
    exchange.register_currency(Currency::crypto(CurrencyCode::new("ETH").unwrap(), "Ether"));
    exchange.register_currency(Currency::fiat(CurrencyCode::new("INR").unwrap(), "Indian Rupee"));
    exchange
}
