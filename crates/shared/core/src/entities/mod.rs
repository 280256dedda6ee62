mod balance;
mod currency;
mod execution_type;
mod fee;
mod last_price;
mod order;
mod order_status;
mod side;
mod trade;
mod trading_pair;

pub use balance::{Balance, BalanceKey, LedgerEntry};
pub use currency::{Currency, CurrencyCode};
pub use execution_type::ExecutionType;
pub use fee::{FeeRates, FeeSchedule, LiquidityRole};
pub use last_price::LastTradedPrice;
pub use order::{Order, OrderId};
pub use order_status::OrderStatus;
pub use side::Side;
pub use trade::{Trade, TradeId};
pub use trading_pair::TradingPair;
