use std::collections::BTreeMap;
use std::sync::Arc;

use bourse_core::{Amount, Balance, BalanceKey, CurrencyCode, LedgerEntry, UserId};
use bourse_ports::{BalanceRepository, LedgerError, LedgerResult};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::locking::RetryPolicy;

/// In-memory balance ledger with row-level locks
///
/// Each (user, currency) row has its own mutex. A batch locks its rows in
/// ascending `BalanceKey` order, so two batches touching overlapping rows
/// can never wait on each other in a cycle.
pub struct InMemoryBalanceRepository {
    rows: DashMap<BalanceKey, Arc<Mutex<Amount>>>,
    policy: RetryPolicy,
}

impl InMemoryBalanceRepository {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            rows: DashMap::new(),
            policy,
        }
    }

    /// Row handle, created at zero on first use
    fn row(&self, key: &BalanceKey) -> Arc<Mutex<Amount>> {
        let entry = self
            .rows
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Decimal::ZERO)));
        Arc::clone(entry.value())
    }
}

impl Default for InMemoryBalanceRepository {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl BalanceRepository for InMemoryBalanceRepository {
    fn available(&self, user: UserId, currency: &CurrencyCode) -> Amount {
        let key = BalanceKey::new(user, currency.clone());
        // Clone the handle out so the map shard is not held while locking
        let row = self.rows.get(&key).map(|r| Arc::clone(r.value()));
        row.map(|r| *r.lock()).unwrap_or(Decimal::ZERO)
    }

    fn balances_for(&self, user: UserId) -> Vec<Balance> {
        let rows: Vec<(BalanceKey, Arc<Mutex<Amount>>)> = self
            .rows
            .iter()
            .filter(|r| r.key().user == user)
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        let mut balances: Vec<Balance> = rows
            .into_iter()
            .map(|(key, row)| Balance {
                user: key.user,
                currency: key.currency,
                available: *row.lock(),
            })
            .collect();
        balances.sort_by(|a, b| a.currency.cmp(&b.currency));
        balances
    }

    fn apply(&self, entries: &[LedgerEntry]) -> LedgerResult<()> {
        // Net the batch per row; BTreeMap iteration gives the lock order
        let mut deltas: BTreeMap<&BalanceKey, Amount> = BTreeMap::new();
        for entry in entries {
            let delta = deltas.entry(&entry.key).or_insert(Decimal::ZERO);
            *delta = delta
                .checked_add(entry.delta)
                .ok_or_else(|| LedgerError::overflow(&entry.key))?;
        }

        let rows: Vec<(&BalanceKey, Amount, Arc<Mutex<Amount>>)> = deltas
            .into_iter()
            .filter(|(_, delta)| !delta.is_zero())
            .map(|(key, delta)| (key, delta, self.row(key)))
            .collect();

        let mut guards = Vec::with_capacity(rows.len());
        for (key, _, row) in &rows {
            guards.push(self.policy.lock(&**row, key)?);
        }

        let mut next = Vec::with_capacity(rows.len());
        for ((key, delta, _), guard) in rows.iter().zip(&guards) {
            let balance = guard
                .checked_add(*delta)
                .ok_or_else(|| LedgerError::overflow(key))?;
            if balance < Decimal::ZERO {
                return Err(LedgerError::negative(key, balance));
            }
            next.push(balance);
        }

        for (guard, balance) in guards.iter_mut().zip(next) {
            **guard = balance;
        }
        Ok(())
    }
}
