use bourse_core::{
    Currency, CurrencyCode, FeeSchedule, LastTradedPrice, Order, OrderId, Trade, TradingPair,
    UserId,
};
use bourse_ports::{
    CurrencyRepository, FeeScheduleRepository, OrderRepository, PriceRepository, TradeRepository,
};
use dashmap::DashMap;
use parking_lot::RwLock;

/// In-memory order store
///
/// Thread-safe storage for orders using DashMap.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: DashMap<OrderId, Order>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn get(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).map(|o| o.value().clone())
    }

    fn save(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    fn by_user(&self, user: UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.user_id == user)
            .map(|o| o.value().clone())
            .collect();
        orders.sort_by_key(|o| o.sequence);
        orders
    }
}

/// In-memory append-only trade log
#[derive(Default)]
pub struct InMemoryTradeRepository {
    trades: RwLock<Vec<Trade>>,
}

impl InMemoryTradeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeRepository for InMemoryTradeRepository {
    fn append(&self, trade: Trade) {
        self.trades.write().push(trade);
    }

    fn by_pair(&self, pair: &TradingPair) -> Vec<Trade> {
        self.trades
            .read()
            .iter()
            .filter(|t| &t.pair == pair)
            .cloned()
            .collect()
    }

    fn by_order(&self, order_id: OrderId) -> Vec<Trade> {
        self.trades
            .read()
            .iter()
            .filter(|t| t.involves(order_id))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryPriceRepository {
    prices: DashMap<TradingPair, LastTradedPrice>,
}

impl InMemoryPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceRepository for InMemoryPriceRepository {
    fn get(&self, pair: &TradingPair) -> Option<LastTradedPrice> {
        self.prices.get(pair).map(|p| p.value().clone())
    }

    fn upsert(&self, price: LastTradedPrice) {
        self.prices.insert(price.pair.clone(), price);
    }
}

/// One schedule row per pair
#[derive(Default)]
pub struct InMemoryFeeScheduleRepository {
    schedules: DashMap<TradingPair, FeeSchedule>,
}

impl InMemoryFeeScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeeScheduleRepository for InMemoryFeeScheduleRepository {
    fn active_for(&self, pair: &TradingPair) -> Option<FeeSchedule> {
        self.schedules
            .get(pair)
            .filter(|s| s.active)
            .map(|s| s.value().clone())
    }

    fn upsert(&self, schedule: FeeSchedule) {
        self.schedules.insert(schedule.pair.clone(), schedule);
    }
}

#[derive(Default)]
pub struct InMemoryCurrencyRepository {
    currencies: DashMap<CurrencyCode, Currency>,
}

impl InMemoryCurrencyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CurrencyRepository for InMemoryCurrencyRepository {
    fn get(&self, symbol: &CurrencyCode) -> Option<Currency> {
        self.currencies.get(symbol).map(|c| c.value().clone())
    }

    fn save(&self, currency: Currency) {
        self.currencies.insert(currency.symbol.clone(), currency);
    }

    fn list(&self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> =
            self.currencies.iter().map(|c| c.value().clone()).collect();
        currencies.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        currencies
    }
}
