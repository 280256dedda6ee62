use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::Arc;

use bourse_core::{
    ExchangeEvent, FeeRates, LastTradedPrice, Order, OrderId, Price, Quantity, Timestamp, Trade,
    TradingPair,
};
use bourse_matching::{MatchProposal, MatchingAlgorithm, MatchingError, OrderBook};
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};

use super::settlement::{LedgerJournal, settle};
use crate::error::{ExchangeError, Result};

/// Everything a matching pass produced, not yet committed
///
/// The book already reflects the pass; `rollback` puts it back.
#[derive(Debug)]
pub struct PassOutcome {
    pub journal: LedgerJournal,
    /// Final state of every order the pass touched, in arrival order
    pub orders: Vec<Order>,
    pub trades: Vec<Trade>,
    pub events: Vec<ExchangeEvent>,
    /// Touched orders as they were before the pass
    originals: Vec<Order>,
}

impl PassOutcome {
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Undo the pass's edits to `book`
    pub fn rollback(self, book: &mut OrderBook) {
        debug!(
            "Rolling back pass on {}: {} orders restored",
            book.pair(),
            self.originals.len()
        );
        for order in self.originals {
            book.restore(order);
        }
    }
}

#[derive(Default)]
struct Staging {
    journal: LedgerJournal,
    touched: BTreeMap<u64, Order>,
    originals: HashMap<OrderId, Order>,
    trades: Vec<Trade>,
    events: Vec<ExchangeEvent>,
}

impl Staging {
    /// Keep the pre-pass state of `order`; later calls for the same id are
    /// ignored
    fn remember(&mut self, order: &Order) {
        self.originals
            .entry(order.id)
            .or_insert_with(|| order.clone());
    }

    fn finish(self) -> PassOutcome {
        PassOutcome {
            journal: self.journal,
            orders: self.touched.into_values().collect(),
            trades: self.trades,
            events: self.events,
            originals: self.originals.into_values().collect(),
        }
    }
}

/// Runs matching passes over a pair's book
///
/// A pass edits the book in place and stages balance changes in a journal.
/// It either returns a complete outcome or an error with the book restored.
pub struct MatchingEngine {
    matcher: Arc<dyn MatchingAlgorithm>,
    quantity_scale: u32,
}

impl MatchingEngine {
    pub fn new(matcher: Arc<dyn MatchingAlgorithm>, quantity_scale: u32) -> Self {
        Self {
            matcher,
            quantity_scale,
        }
    }

    pub fn algorithm(&self) -> &str {
        self.matcher.name()
    }

    /// Match the best bid against the best ask until the book no longer
    /// crosses, then cancel whatever is left of `incoming` if it is a market
    /// order.
    pub fn run_pass(
        &self,
        book: &mut OrderBook,
        incoming: OrderId,
        rates: &FeeRates,
        last_price: Option<Price>,
        now: Timestamp,
    ) -> Result<PassOutcome> {
        let mut staging = Staging::default();
        match self.match_book(book, incoming, rates, last_price, now, &mut staging) {
            Ok(()) => Ok(staging.finish()),
            Err(err) => {
                staging.finish().rollback(book);
                Err(err)
            }
        }
    }

    fn match_book(
        &self,
        book: &mut OrderBook,
        incoming: OrderId,
        rates: &FeeRates,
        last_price: Option<Price>,
        now: Timestamp,
        staging: &mut Staging,
    ) -> Result<()> {
        let mut last_price = last_price;

        loop {
            let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) else {
                break;
            };
            if !self.matcher.can_match(bid, ask) {
                break;
            }

            let mut buy = bid.clone();
            let mut sell = ask.clone();

            let proposal = match self.matcher.match_orders(&buy, &sell, last_price) {
                Ok(proposal) => proposal,
                Err(MatchingError::NoPriceAvailable) => {
                    warn!("No reference price for {}, stopping pass", book.pair());
                    break;
                }
                Err(err) => return Err(invariant(book.pair(), err)),
            };

            let quantity = self.affordable_quantity(&buy, &proposal, rates);
            if quantity <= Decimal::ZERO {
                debug!("Market buy {} cannot afford more at {}", buy.id, proposal.price);
                break;
            }
            let proposal = MatchProposal {
                quantity,
                ..proposal
            };

            staging.remember(&buy);
            staging.remember(&sell);
            let trade = settle(&mut buy, &mut sell, &proposal, rates, now, &mut staging.journal)
                .map_err(|err| invariant(book.pair(), err))?;
            debug!(
                "Trade {} on {}: {} @ {} (fees buyer={} seller={})",
                trade.id, trade.pair, trade.quantity, trade.price, trade.fee_buyer, trade.fee_seller
            );

            book.update(buy.clone());
            book.update(sell.clone());
            last_price = Some(trade.price);

            staging.events.push(ExchangeEvent::TradeExecuted {
                trade: trade.clone(),
            });
            staging.events.push(ExchangeEvent::LastPriceUpdated {
                price: LastTradedPrice::new(trade.pair.clone(), trade.price, now),
            });
            staging.events.push(ExchangeEvent::order_updated(&buy));
            staging.events.push(ExchangeEvent::order_updated(&sell));

            staging.touched.insert(buy.sequence, buy);
            staging.touched.insert(sell.sequence, sell);
            staging.trades.push(trade);
        }

        // Market orders never rest, so `incoming` is the only one that can be
        // in the book
        let Some(order) = book.get(incoming).filter(|o| o.is_market()).cloned() else {
            return Ok(());
        };
        staging.remember(&order);
        book.remove(order.id);

        let mut order = order;
        let released = order.cancel(now).map_err(|err| invariant(book.pair(), err))?;
        let currency = order.reservation_currency().clone();
        staging
            .journal
            .credit(order.user_id, &currency, released)
            .map_err(|err| invariant(book.pair(), err))?;
        warn!(
            "Cancelled unmatched remainder {} of market order {} (released {} {})",
            order.remaining_quantity, order.id, released, currency
        );
        staging.events.push(ExchangeEvent::OrderCancelled {
            order_id: order.id,
            pair: order.pair.clone(),
            released,
            timestamp: now,
        });
        staging.touched.insert(order.sequence, order);
        Ok(())
    }

    /// Quantity of the proposal the buyer can pay for.
    ///
    /// Limit buys always can. A market buy is capped by its remaining spend
    /// ceiling at the trade price including its fee, truncated to the
    /// quantity scale.
    fn affordable_quantity(
        &self,
        buy: &Order,
        proposal: &MatchProposal,
        rates: &FeeRates,
    ) -> Quantity {
        if !buy.is_market() {
            return proposal.quantity;
        }

        let buyer_rate = if proposal.buyer_is_maker() {
            rates.maker
        } else {
            rates.taker
        };
        let Some(unit_cost) = proposal.price.checked_mul(Decimal::ONE + buyer_rate) else {
            return Decimal::ZERO;
        };
        if unit_cost <= Decimal::ZERO {
            return proposal.quantity;
        }
        let Some(units) = buy.locked_funds.checked_div(unit_cost) else {
            return proposal.quantity;
        };

        let step = Decimal::new(1, self.quantity_scale);
        let mut affordable = units
            .round_dp_with_strategy(self.quantity_scale, RoundingStrategy::ToZero)
            .min(proposal.quantity);
        if affordable
            .checked_mul(unit_cost)
            .is_none_or(|cost| cost > buy.locked_funds)
        {
            affordable -= step;
        }
        affordable
    }
}

fn invariant(pair: &TradingPair, err: impl Display) -> ExchangeError {
    ExchangeError::LedgerInvariantViolation(format!("{}: {}", pair, err))
}
