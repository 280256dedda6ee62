use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CurrencyCode;
use crate::values::{Amount, UserId};

/// Identifies one balance row.
///
/// Field order matters: the derived `Ord` sorts by currency first, then
/// user, which is the global order rows are locked in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub currency: CurrencyCode,
    pub user: UserId,
}

impl BalanceKey {
    pub fn new(user: UserId, currency: CurrencyCode) -> Self {
        Self { currency, user }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.currency)
    }
}

/// Available amount of one currency held by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user: UserId,
    pub currency: CurrencyCode,
    pub available: Amount,
}

/// A signed change to one balance row. Positive credits, negative debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: BalanceKey,
    pub delta: Amount,
}

impl LedgerEntry {
    pub fn credit(user: UserId, currency: CurrencyCode, amount: Amount) -> Self {
        Self {
            key: BalanceKey::new(user, currency),
            delta: amount,
        }
    }

    pub fn debit(user: UserId, currency: CurrencyCode, amount: Amount) -> Self {
        Self {
            key: BalanceKey::new(user, currency),
            delta: -amount,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.delta == Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_key_orders_by_currency_then_user() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let btc = CurrencyCode::new("BTC").unwrap();
        let inr = CurrencyCode::new("INR").unwrap();

        let mut keys = vec![
            BalanceKey::new(low, inr.clone()),
            BalanceKey::new(high, btc.clone()),
            BalanceKey::new(low, btc.clone()),
        ];
        keys.sort();

        assert_eq!(keys[0], BalanceKey::new(low, btc.clone()));
        assert_eq!(keys[1], BalanceKey::new(high, btc));
        assert_eq!(keys[2], BalanceKey::new(low, inr));
    }
}
