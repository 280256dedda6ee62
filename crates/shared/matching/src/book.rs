use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use bourse_core::{Order, OrderId, Price, Quantity, Side, TradingPair};
use bourse_ports::{MatchingError, MatchingResult};
use priority_queue::PriorityQueue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bid ranking: market orders first, then higher price, then earlier arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BidPriority {
    market: bool,
    price: Decimal,
    arrival: Reverse<u64>,
}

/// Ask ranking: market orders first, then lower price, then earlier arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct AskPriority {
    market: bool,
    price: Reverse<Decimal>,
    arrival: Reverse<u64>,
}

impl BidPriority {
    fn of(order: &Order) -> Self {
        Self {
            market: order.is_market(),
            price: order.limit_price.unwrap_or(Decimal::ZERO),
            arrival: Reverse(order.sequence),
        }
    }
}

impl AskPriority {
    fn of(order: &Order) -> Self {
        Self {
            market: order.is_market(),
            price: Reverse(order.limit_price.unwrap_or(Decimal::ZERO)),
            arrival: Reverse(order.sequence),
        }
    }
}

/// Aggregated quantity at one price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

/// Top-of-book snapshot, best levels first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDepth {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Open orders of a single trading pair
///
/// Each side is an indexed heap keyed by order id: peeking the best order
/// is O(1), inserts and removals by id are O(log n) and `update` is a map
/// write. The full order is kept alongside in `orders`; the heaps only hold
/// ranking keys. A matching pass edits the book in place, touching only the
/// orders it matches, and undoes those edits with `restore` if it fails.
#[derive(Debug)]
pub struct OrderBook {
    pair: TradingPair,
    bids: PriorityQueue<OrderId, BidPriority>,
    asks: PriorityQueue<OrderId, AskPriority>,
    orders: HashMap<OrderId, Order>,
}

impl OrderBook {
    pub fn new(pair: TradingPair) -> Self {
        Self {
            pair,
            bids: PriorityQueue::new(),
            asks: PriorityQueue::new(),
            orders: HashMap::new(),
        }
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Add an open order. Market orders rank ahead of every limit price.
    pub fn insert(&mut self, order: Order) -> MatchingResult<()> {
        if order.pair != self.pair {
            return Err(MatchingError::PairMismatch {
                order_id: order.id,
                expected: self.pair.clone(),
                actual: order.pair,
            });
        }
        if !order.is_open() {
            return Err(MatchingError::OrderNotOpen {
                order_id: order.id,
                status: order.status,
            });
        }
        if order.execution_type.requires_price() && order.limit_price.is_none() {
            return Err(MatchingError::MissingPrice(order.id));
        }
        if self.orders.contains_key(&order.id) {
            return Err(MatchingError::DuplicateOrder(order.id));
        }

        match order.side {
            Side::Buy => {
                self.bids.push(order.id, BidPriority::of(&order));
            }
            Side::Sell => {
                self.asks.push(order.id, AskPriority::of(&order));
            }
        }
        self.orders.insert(order.id, order);
        Ok(())
    }

    /// Best buy order (highest bidder, earliest at that price)
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.peek().and_then(|(id, _)| self.orders.get(id))
    }

    /// Best sell order (lowest asker, earliest at that price)
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.peek().and_then(|(id, _)| self.orders.get(id))
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        self.best_bid().and_then(|o| o.limit_price)
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.best_ask().and_then(|o| o.limit_price)
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Store the new state of an order already in the book.
    ///
    /// Ranking keys never change after insertion, so only the stored order is
    /// replaced. An order that is no longer open leaves the book and is
    /// returned.
    pub fn update(&mut self, order: Order) -> Option<Order> {
        if !self.orders.contains_key(&order.id) {
            return None;
        }
        if order.is_open() {
            self.orders.insert(order.id, order);
            None
        } else {
            self.remove(order.id);
            Some(order)
        }
    }

    /// Remove an order by id
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let order = self.orders.remove(&order_id)?;
        match order.side {
            Side::Buy => {
                self.bids.remove(&order_id);
            }
            Side::Sell => {
                self.asks.remove(&order_id);
            }
        }
        Some(order)
    }

    /// Put `order` back exactly as given, replacing whatever the book holds
    /// under its id. No checks: this undoes edits, it does not admit orders.
    pub fn restore(&mut self, order: Order) {
        self.remove(order.id);
        match order.side {
            Side::Buy => {
                self.bids.push(order.id, BidPriority::of(&order));
            }
            Side::Sell => {
                self.asks.push(order.id, AskPriority::of(&order));
            }
        }
        self.orders.insert(order.id, order);
    }

    /// Whether any order rests on `side`
    pub fn has_side(&self, side: Side) -> bool {
        match side {
            Side::Buy => !self.bids.is_empty(),
            Side::Sell => !self.asks.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Aggregate limit orders into at most `levels` price levels per side.
    /// Market orders have no price and are left out.
    pub fn depth(&self, levels: usize) -> BookDepth {
        let mut bids: BTreeMap<Price, PriceLevel> = BTreeMap::new();
        let mut asks: BTreeMap<Price, PriceLevel> = BTreeMap::new();

        for order in self.orders.values() {
            let Some(price) = order.limit_price else {
                continue;
            };
            let side = match order.side {
                Side::Buy => &mut bids,
                Side::Sell => &mut asks,
            };
            let level = side.entry(price).or_insert(PriceLevel {
                price,
                quantity: Decimal::ZERO,
                order_count: 0,
            });
            level.quantity = level.quantity.saturating_add(order.remaining_quantity);
            level.order_count += 1;
        }

        BookDepth {
            bids: bids.into_values().rev().take(levels).collect(),
            asks: asks.into_values().take(levels).collect(),
        }
    }
}
