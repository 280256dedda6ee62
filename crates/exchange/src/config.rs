//! Configuration loading for the exchange
//!
//! Supports JSON configuration files for:
//! - Lock retry policy and event channel sizing
//! - Currency reference data
//! - Fee schedules, given in percent
//! - Accounts with initial deposits

use bourse_core::{Amount, Currency, CurrencyCode, FeeSchedule, TradingPair, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Root configuration for the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Exchange name/identifier
    pub name: String,

    /// Retry policy for per-pair sections and balance row locks
    pub locking: LockingConfig,

    /// Capacity of each event broadcast channel
    pub event_capacity: usize,

    /// Decimal places a market buy's affordable quantity is truncated to
    pub quantity_scale: u32,

    pub currencies: Vec<CurrencyConfig>,

    pub fee_schedules: Vec<FeeScheduleConfig>,

    /// Accounts to seed with deposits
    pub accounts: Vec<AccountConfig>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: "Bourse".to_string(),
            locking: LockingConfig::default(),
            event_capacity: 10_000,
            quantity_scale: 8,
            currencies: Vec::new(),
            fee_schedules: Vec::new(),
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockingConfig {
    pub max_attempts: u32,
    pub acquire_timeout_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            acquire_timeout_ms: 50,
            initial_backoff_ms: 1,
            max_backoff_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_crypto: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeScheduleConfig {
    pub base: String,
    pub quote: String,
    /// Percent, e.g. `0.1` for 0.1%
    pub maker_fee_percent: Decimal,
    pub taker_fee_percent: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub user: UserId,
    #[serde(default)]
    pub deposits: Vec<DepositConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositConfig {
    pub currency: String,
    pub amount: Decimal,
}

fn default_true() -> bool {
    true
}

impl ExchangeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Currency reference data as domain values
    pub fn currencies(&self) -> Result<Vec<Currency>, ConfigError> {
        self.currencies
            .iter()
            .map(|c| {
                let symbol = CurrencyCode::new(&c.symbol)
                    .map_err(|e| ConfigError::InvalidCurrency(e.to_string()))?;
                Ok(Currency {
                    name: if c.name.is_empty() {
                        symbol.to_string()
                    } else {
                        c.name.clone()
                    },
                    symbol,
                    is_crypto: c.is_crypto,
                    active: c.active,
                })
            })
            .collect()
    }

    /// Fee schedules converted from percent to fractions
    pub fn fee_schedules(&self) -> Result<Vec<FeeSchedule>, ConfigError> {
        self.fee_schedules
            .iter()
            .map(|f| {
                let pair = TradingPair::parse(&f.base, &f.quote)
                    .map_err(|e| ConfigError::InvalidFee(e.to_string()))?;
                let schedule =
                    FeeSchedule::from_percent(pair, f.maker_fee_percent, f.taker_fee_percent)
                        .map_err(|e| ConfigError::InvalidFee(e.to_string()))?;
                Ok(if f.active {
                    schedule
                } else {
                    schedule.deactivated()
                })
            })
            .collect()
    }

    /// Flattened list of seed deposits
    pub fn deposits(&self) -> Result<Vec<(UserId, CurrencyCode, Amount)>, ConfigError> {
        let mut deposits = Vec::new();
        for account in &self.accounts {
            for deposit in &account.deposits {
                let currency = CurrencyCode::new(&deposit.currency)
                    .map_err(|e| ConfigError::InvalidAccount(e.to_string()))?;
                if deposit.amount <= Decimal::ZERO {
                    return Err(ConfigError::InvalidAccount(format!(
                        "deposit of {} {} for {} must be positive",
                        deposit.amount, currency, account.user
                    )));
                }
                deposits.push((account.user, currency, deposit.amount));
            }
        }
        Ok(deposits)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid currency config: {0}")]
    InvalidCurrency(String),

    #[error("Invalid fee schedule config: {0}")]
    InvalidFee(String),

    #[error("Invalid account config: {0}")]
    InvalidAccount(String),
}
