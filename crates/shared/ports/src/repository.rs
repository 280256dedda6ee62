use bourse_core::{
    Currency, CurrencyCode, FeeSchedule, LastTradedPrice, Order, OrderId, Trade, TradingPair,
    UserId,
};

/// Order rows. Orders are never deleted; terminal states are kept for audit.
pub trait OrderRepository: Send + Sync {
    fn get(&self, id: OrderId) -> Option<Order>;

    /// Insert or update
    fn save(&self, order: Order);

    fn save_all(&self, orders: &[Order]) {
        for order in orders {
            self.save(order.clone());
        }
    }

    /// All orders of a user, oldest first
    fn by_user(&self, user: UserId) -> Vec<Order>;
}

/// Append-only trade log
pub trait TradeRepository: Send + Sync {
    fn append(&self, trade: Trade);

    /// Trades of a pair in execution order
    fn by_pair(&self, pair: &TradingPair) -> Vec<Trade>;

    /// Trades where the order was either the buy or the sell side
    fn by_order(&self, order_id: OrderId) -> Vec<Trade>;
}

/// Last traded price cache, one row per pair
pub trait PriceRepository: Send + Sync {
    fn get(&self, pair: &TradingPair) -> Option<LastTradedPrice>;

    fn upsert(&self, price: LastTradedPrice);
}

/// Fee schedule rows. Read-only to the matching path.
pub trait FeeScheduleRepository: Send + Sync {
    /// The active schedule for `pair`, if any
    fn active_for(&self, pair: &TradingPair) -> Option<FeeSchedule>;

    /// Replace the schedule for `schedule.pair`
    fn upsert(&self, schedule: FeeSchedule);
}

/// Currency reference data
pub trait CurrencyRepository: Send + Sync {
    fn get(&self, symbol: &CurrencyCode) -> Option<Currency>;

    fn save(&self, currency: Currency);

    fn list(&self) -> Vec<Currency>;

    fn is_active(&self, symbol: &CurrencyCode) -> bool {
        self.get(symbol).is_some_and(|c| c.active)
    }
}
