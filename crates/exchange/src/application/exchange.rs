use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bourse_core::{
    Amount, Balance, Currency, CurrencyCode, ExchangeEvent, ExecutionType, FeeRates, FeeSchedule,
    LastTradedPrice, LedgerEntry, Order, OrderId, OrderStatus, Price, Quantity, Side, Timestamp,
    Trade, TradingPair, UserId,
};
use bourse_matching::{BookDepth, OrderBook, PriceTimeMatcher};
use bourse_ports::{
    BalanceRepository, Clock, CurrencyRepository, EventSink, FeeScheduleRepository, LedgerError,
    OrderRepository, PriceRepository, TradeRepository,
};
use dashmap::DashMap;
use log::{error, info, warn};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use super::fee_lookup::FeeScheduleLookup;
use super::fund_reservation::FundReservation;
use super::matching_engine::{MatchingEngine, PassOutcome};
use super::trade_recorder::TradeRecorder;
use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::infrastructure::{
    BroadcastEventPublisher, InMemoryBalanceRepository, InMemoryCurrencyRepository,
    InMemoryFeeScheduleRepository, InMemoryOrderRepository, InMemoryPriceRepository,
    InMemoryTradeRepository,
};
use crate::locking::RetryPolicy;

/// Storage the engine reads and writes through
#[derive(Clone)]
pub struct Repositories {
    pub balances: Arc<dyn BalanceRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub trades: Arc<dyn TradeRepository>,
    pub prices: Arc<dyn PriceRepository>,
    pub fee_schedules: Arc<dyn FeeScheduleRepository>,
    pub currencies: Arc<dyn CurrencyRepository>,
}

impl Repositories {
    pub fn in_memory(policy: RetryPolicy) -> Self {
        Self {
            balances: Arc::new(InMemoryBalanceRepository::new(policy)),
            orders: Arc::new(InMemoryOrderRepository::new()),
            trades: Arc::new(InMemoryTradeRepository::new()),
            prices: Arc::new(InMemoryPriceRepository::new()),
            fee_schedules: Arc::new(InMemoryFeeScheduleRepository::new()),
            currencies: Arc::new(InMemoryCurrencyRepository::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOrderCommand {
    pub user: UserId,
    pub pair: TradingPair,
    pub side: Side,
    pub execution_type: ExecutionType,
    pub limit_price: Option<Price>,
    pub quantity: Quantity,
    /// Spend ceiling reserved by a MARKET BUY, in quote
    pub max_spend: Option<Amount>,
}

impl SubmitOrderCommand {
    pub fn limit(
        user: UserId,
        pair: TradingPair,
        side: Side,
        quantity: Quantity,
        limit_price: Price,
    ) -> Self {
        Self {
            user,
            pair,
            side,
            execution_type: ExecutionType::Limit,
            limit_price: Some(limit_price),
            quantity,
            max_spend: None,
        }
    }

    pub fn market_sell(user: UserId, pair: TradingPair, quantity: Quantity) -> Self {
        Self {
            user,
            pair,
            side: Side::Sell,
            execution_type: ExecutionType::Market,
            limit_price: None,
            quantity,
            max_spend: None,
        }
    }

    pub fn market_buy(
        user: UserId,
        pair: TradingPair,
        quantity: Quantity,
        max_spend: Amount,
    ) -> Self {
        Self {
            user,
            pair,
            side: Side::Buy,
            execution_type: ExecutionType::Market,
            limit_price: None,
            quantity,
            max_spend: Some(max_spend),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(
                "quantity must be greater than zero".to_string(),
            ));
        }
        match self.execution_type {
            ExecutionType::Limit => match self.limit_price {
                None => Err(ExchangeError::InvalidOrder(
                    "limit price required for LIMIT orders".to_string(),
                )),
                Some(price) if price <= Decimal::ZERO => Err(ExchangeError::InvalidOrder(
                    "limit price must be greater than zero".to_string(),
                )),
                Some(_) => Ok(()),
            },
            ExecutionType::Market => {
                if self.limit_price.is_some() {
                    return Err(ExchangeError::InvalidOrder(
                        "MARKET orders do not take a limit price".to_string(),
                    ));
                }
                if self.side == Side::Buy && !self.max_spend.is_some_and(|s| s > Decimal::ZERO) {
                    return Err(ExchangeError::InvalidOrder(
                        "MARKET BUY orders need a positive spend ceiling".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOrderResult {
    /// The submitted order after its matching pass
    pub order: Order,
    /// Trades produced by the pass, in execution order
    pub trades: Vec<Trade>,
}

impl SubmitOrderResult {
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }
}

/// Acknowledgement of a cancel request
#[derive(Debug, Clone, PartialEq)]
pub struct CancelAck {
    pub order_id: OrderId,
    /// Status after the request
    pub status: OrderStatus,
    pub released: Amount,
    /// False when the order was already terminal and nothing changed
    pub changed: bool,
}

impl CancelAck {
    fn noop(order: &Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            released: Decimal::ZERO,
            changed: false,
        }
    }
}

/// The matching engine service
///
/// Each trading pair has its own book behind an exclusive section; a
/// submission or cancellation holds that section for its whole duration, so
/// passes on one pair are serialized while different pairs run in parallel.
/// Balance rows are only locked while a section is held, never the other
/// way round.
pub struct Exchange {
    name: String,
    clock: Arc<dyn Clock>,
    repos: Repositories,
    books: DashMap<TradingPair, Arc<Mutex<OrderBook>>>,
    lock_policy: RetryPolicy,
    reservation: FundReservation,
    fees: FeeScheduleLookup,
    engine: MatchingEngine,
    recorder: TradeRecorder,
    publisher: Arc<BroadcastEventPublisher>,
    /// Arrival counter; breaks price ties
    sequence: AtomicU64,
}

impl Exchange {
    /// Create an exchange over the given storage
    pub fn new(config: &ExchangeConfig, clock: Arc<dyn Clock>, repos: Repositories) -> Self {
        Self {
            name: config.name.clone(),
            clock,
            books: DashMap::new(),
            lock_policy: RetryPolicy::from_config(&config.locking),
            reservation: FundReservation::new(Arc::clone(&repos.balances)),
            fees: FeeScheduleLookup::new(Arc::clone(&repos.fee_schedules)),
            engine: MatchingEngine::new(Arc::new(PriceTimeMatcher::new()), config.quantity_scale),
            recorder: TradeRecorder::new(Arc::clone(&repos.trades), Arc::clone(&repos.prices)),
            publisher: Arc::new(BroadcastEventPublisher::new(config.event_capacity)),
            sequence: AtomicU64::new(0),
            repos,
        }
    }

    /// Empty in-memory exchange with default settings
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        let config = ExchangeConfig::default();
        let repos = Repositories::in_memory(RetryPolicy::from_config(&config.locking));
        Self::new(&config, clock, repos)
    }

    /// In-memory exchange seeded with the config's currencies, fee
    /// schedules and deposits
    pub fn from_config(config: &ExchangeConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let repos = Repositories::in_memory(RetryPolicy::from_config(&config.locking));
        let exchange = Self::new(config, clock, repos);

        let currencies = config.currencies()?;
        let schedules = config.fee_schedules()?;
        let deposits = config.deposits()?;

        for currency in currencies.iter().cloned() {
            exchange.register_currency(currency);
        }
        for schedule in schedules.iter().cloned() {
            exchange.set_fee_schedule(schedule)?;
        }
        for (user, currency, amount) in &deposits {
            exchange.deposit(*user, currency, *amount)?;
        }

        info!(
            "Exchange '{}' ready on {}: {} currencies, {} fee schedules, {} deposits",
            exchange.name,
            exchange.clock.name(),
            currencies.len(),
            schedules.len(),
            deposits.len()
        );
        Ok(exchange)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matching_algorithm(&self) -> &str {
        self.engine.algorithm()
    }

    // ------------------------------------------------------------------
    // Reference data and funding
    // ------------------------------------------------------------------

    pub fn register_currency(&self, currency: Currency) {
        info!(
            "Registered currency {} ({})",
            currency.symbol,
            if currency.active { "active" } else { "inactive" }
        );
        self.repos.currencies.save(currency);
    }

    pub fn currencies(&self) -> Vec<Currency> {
        self.repos.currencies.list()
    }

    /// Credit `amount` to the user's available balance. Returns the new
    /// available amount.
    pub fn deposit(&self, user: UserId, currency: &CurrencyCode, amount: Amount) -> Result<Amount> {
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidRequest(format!(
                "deposit amount must be positive: {}",
                amount
            )));
        }
        if !self.repos.currencies.is_active(currency) {
            return Err(ExchangeError::InvalidRequest(format!(
                "unknown or inactive currency {}",
                currency
            )));
        }

        self.repos
            .balances
            .apply(&[LedgerEntry::credit(user, currency.clone(), amount)])
            .map_err(|err| match err {
                LedgerError::Overflow { .. } => ExchangeError::InvalidRequest(format!(
                    "deposit of {} {} would exceed the largest balance",
                    amount, currency
                )),
                other => other.into(),
            })?;
        let available = self.repos.balances.available(user, currency);
        info!("Deposited {} {} for {} (available {})", amount, currency, user, available);
        Ok(available)
    }

    /// Install the active fee schedule for a pair, replacing any previous one
    pub fn set_fee_schedule(&self, schedule: FeeSchedule) -> Result<()> {
        self.check_pair(&schedule.pair)
            .map_err(ExchangeError::InvalidRequest)?;
        info!(
            "Fee schedule for {}: maker={} taker={} active={}",
            schedule.pair, schedule.maker_fee_fraction, schedule.taker_fee_fraction, schedule.active
        );
        self.fees.set(schedule);
        Ok(())
    }

    /// Maker/taker fractions of the pair's active schedule
    pub fn fee_schedule(&self, pair: &TradingPair) -> Option<FeeRates> {
        self.fees.schedule(pair).map(|s| s.rates())
    }

    // ------------------------------------------------------------------
    // Order flow
    // ------------------------------------------------------------------

    /// Lock funds for a new order, place it in the book and run a matching
    /// pass for its pair.
    ///
    /// If the pass fails the book is left as it was before the call, the
    /// reservation is released and the order is neither stored nor
    /// announced.
    pub fn submit_order(&self, command: SubmitOrderCommand) -> Result<SubmitOrderResult> {
        command.validate()?;
        self.check_pair(&command.pair)
            .map_err(ExchangeError::InvalidOrder)?;

        let cell = self.book_for(&command.pair);
        let mut book = self
            .lock_policy
            .lock(&*cell, format!("book {}", command.pair))?;

        if command.execution_type.is_immediate_or_cancel() && !book.has_side(command.side.opposite())
        {
            return Err(ExchangeError::InvalidOrder(format!(
                "no resting liquidity on {} for MARKET {}",
                command.pair, command.side
            )));
        }

        let now = self.clock.now();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut order = match command.execution_type {
            ExecutionType::Limit => {
                let price = command.limit_price.ok_or_else(|| {
                    ExchangeError::InvalidOrder("limit price required for LIMIT orders".to_string())
                })?;
                Order::new_limit(
                    command.user,
                    command.pair,
                    command.side,
                    command.quantity,
                    price,
                    sequence,
                    now,
                )
            }
            ExecutionType::Market => Order::new_market(
                command.user,
                command.pair,
                command.side,
                command.quantity,
                sequence,
                now,
            ),
        };
        order.validate()?;

        let rates = self.fees.resolve(&order.pair);
        let required = FundReservation::required(&order, &rates, command.max_spend)?;
        self.reservation.lock_funds(&mut order, required)?;

        if let Err(err) = book.insert(order.clone()) {
            self.reservation.release(&order, now)?;
            return Err(err.into());
        }

        let last_price = self.recorder.last_price(&order.pair).map(|p| p.price);
        let committed = self
            .engine
            .run_pass(&mut book, order.id, &rates, last_price, now)
            .and_then(|outcome| self.commit(&mut book, &order, outcome));

        match committed {
            Ok((orders, trades)) => {
                let order = orders
                    .into_iter()
                    .find(|o| o.id == order.id)
                    .unwrap_or(order);
                Ok(SubmitOrderResult { order, trades })
            }
            Err(err) => {
                if err.is_transient() {
                    warn!("Matching pass on {} not committed: {}", order.pair, err);
                } else {
                    error!("Matching pass on {} rolled back: {}", order.pair, err);
                }
                self.withdraw(&mut book, &order, now);
                Err(err)
            }
        }
    }

    /// Withdraw an open order and release its locked funds.
    ///
    /// Cancelling an order that is already FILLED or CANCELLED succeeds
    /// without changing anything.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<CancelAck> {
        let order = self
            .repos
            .orders
            .get(order_id)
            .ok_or(ExchangeError::OrderNotFound(order_id))?;
        if order.status.is_terminal() {
            info!("Cancel of {} order {} is a no-op", order.status, order_id);
            return Ok(CancelAck::noop(&order));
        }

        let cell = self.book_for(&order.pair);
        let mut book = self
            .lock_policy
            .lock(&*cell, format!("book {}", order.pair))?;

        // A pass may have filled the order while we waited for the section
        let order = self
            .repos
            .orders
            .get(order_id)
            .ok_or(ExchangeError::OrderNotFound(order_id))?;
        if order.status.is_terminal() {
            info!("Cancel of {} order {} is a no-op", order.status, order_id);
            return Ok(CancelAck::noop(&order));
        }

        let now = self.clock.now();
        let (cancelled, released) = self.reservation.release(&order, now)?;
        book.remove(order_id);
        self.repos.orders.save(cancelled.clone());

        info!(
            "Cancelled order {} on {} (released {} {})",
            order_id,
            cancelled.pair,
            released,
            cancelled.reservation_currency()
        );
        self.publisher.publish(ExchangeEvent::OrderCancelled {
            order_id,
            pair: cancelled.pair.clone(),
            released,
            timestamp: now,
        });

        Ok(CancelAck {
            order_id,
            status: cancelled.status,
            released,
            changed: true,
        })
    }

    /// Write a pass's outcome: ledger first, then orders, trades and events.
    ///
    /// `accepted` is stored and announced here, so a submission whose pass
    /// fails leaves no trace. If the ledger rejects the journal the pass is
    /// undone on `book` and nothing is written.
    fn commit(
        &self,
        book: &mut OrderBook,
        accepted: &Order,
        outcome: PassOutcome,
    ) -> Result<(Vec<Order>, Vec<Trade>)> {
        let entries = outcome.journal.entries();
        if let Err(err) = self.repos.balances.apply(&entries) {
            outcome.rollback(book);
            return Err(err.into());
        }
        let PassOutcome {
            mut orders,
            trades,
            events,
            ..
        } = outcome;

        // Highest sequence on the pair, so it sorts last
        if !orders.iter().any(|o| o.id == accepted.id) {
            orders.push(accepted.clone());
        }
        self.repos.orders.save_all(&orders);
        self.recorder.record(&trades);

        info!(
            "Accepted {:?} {} order {} on {}: {} @ {:?} (locked {} {})",
            accepted.execution_type,
            accepted.side,
            accepted.id,
            accepted.pair,
            accepted.quantity,
            accepted.limit_price,
            accepted.locked_funds,
            accepted.reservation_currency()
        );
        if !trades.is_empty() {
            info!(
                "Pass on {} committed: {} trades, {} orders updated",
                book.pair(),
                trades.len(),
                orders.len()
            );
        }
        self.publisher.publish(ExchangeEvent::OrderAccepted {
            order: accepted.clone(),
        });
        self.publisher.publish_all(events);

        Ok((orders, trades))
    }

    /// Take a submission back out after its pass failed. The pass has
    /// already restored the rest of the book; the order was never stored or
    /// announced, so only its reservation is returned.
    fn withdraw(&self, book: &mut OrderBook, order: &Order, now: Timestamp) {
        book.remove(order.id);
        if let Err(err) = self.reservation.release(order, now) {
            error!("Could not release withdrawn order {}: {}", order.id, err);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn balance(&self, user: UserId, currency: &CurrencyCode) -> Amount {
        self.repos.balances.available(user, currency)
    }

    pub fn balances(&self, user: UserId) -> Vec<Balance> {
        self.repos.balances.balances_for(user)
    }

    /// Sum of funds locked in the user's open orders, in `currency`
    pub fn locked_balance(&self, user: UserId, currency: &CurrencyCode) -> Amount {
        self.repos
            .orders
            .by_user(user)
            .iter()
            .filter(|o| o.is_open() && o.reservation_currency() == currency)
            .fold(Decimal::ZERO, |total, o| total.saturating_add(o.locked_funds))
    }

    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.repos.orders.get(order_id)
    }

    pub fn orders_for_user(&self, user: UserId) -> Vec<Order> {
        self.repos.orders.by_user(user)
    }

    pub fn trades_for_pair(&self, pair: &TradingPair) -> Vec<Trade> {
        self.recorder.trades_for_pair(pair)
    }

    pub fn trades_for_order(&self, order_id: OrderId) -> Vec<Trade> {
        self.recorder.trades_for_order(order_id)
    }

    pub fn last_traded_price(&self, pair: &TradingPair) -> Option<LastTradedPrice> {
        self.recorder.last_price(pair)
    }

    /// Aggregated price levels of the pair's book
    pub fn depth(&self, pair: &TradingPair, levels: usize) -> Result<BookDepth> {
        let Some(cell) = self.books.get(pair).map(|b| Arc::clone(b.value())) else {
            return Ok(BookDepth::default());
        };
        let book = self.lock_policy.lock(&*cell, format!("book {}", pair))?;
        Ok(book.depth(levels))
    }

    /// Subscribe to every event
    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.publisher.subscribe()
    }

    /// Subscribe to one pair's events
    pub fn subscribe_pair(&self, pair: &TradingPair) -> broadcast::Receiver<ExchangeEvent> {
        self.publisher.subscribe_pair(pair)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn book_for(&self, pair: &TradingPair) -> Arc<Mutex<OrderBook>> {
        let entry = self
            .books
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(Mutex::new(OrderBook::new(pair.clone()))));
        Arc::clone(entry.value())
    }

    /// A pair is tradable when its currencies differ and both are active
    fn check_pair(&self, pair: &TradingPair) -> std::result::Result<(), String> {
        if pair.base == pair.quote {
            return Err(format!("{} has the same base and quote currency", pair));
        }
        for currency in [&pair.base, &pair.quote] {
            if !self.repos.currencies.is_active(currency) {
                return Err(format!("unknown or inactive currency {} in {}", currency, pair));
            }
        }
        Ok(())
    }
}
