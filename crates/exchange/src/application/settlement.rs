use std::collections::BTreeMap;

use bourse_core::{
    Amount, BalanceKey, CurrencyCode, FeeRates, LedgerEntry, LiquidityRole, Order, OrderError,
    OrderResult, OrderStatus, Timestamp, Trade, UserId,
};
use bourse_ports::MatchProposal;
use rust_decimal::Decimal;

/// Net balance changes staged during a matching pass
///
/// Nothing touches the ledger until the pass commits the journal as one
/// batch; dropping the journal discards the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerJournal {
    deltas: BTreeMap<BalanceKey, Amount>,
}

impl LedgerJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a signed change; negative amounts debit
    pub fn credit(&mut self, user: UserId, currency: &CurrencyCode, amount: Amount) -> OrderResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let key = BalanceKey::new(user, currency.clone());
        let delta = self.deltas.entry(key).or_insert(Decimal::ZERO);
        *delta = delta.checked_add(amount).ok_or_else(|| {
            OrderError::Overflow(format!("net change of {} for user {}", currency, user))
        })?;
        Ok(())
    }

    pub fn net(&self, user: UserId, currency: &CurrencyCode) -> Amount {
        self.deltas
            .get(&BalanceKey::new(user, currency.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.values().all(|d| d.is_zero())
    }

    /// Non-zero net changes, in lock order
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.deltas
            .iter()
            .filter(|(_, delta)| !delta.is_zero())
            .map(|(key, delta)| LedgerEntry {
                key: key.clone(),
                delta: *delta,
            })
            .collect()
    }
}

/// Settle one match between `buy` and `sell`.
///
/// Fills both orders, consumes their reservations and stages the balance
/// changes in `journal`:
/// - buyer: consumes a share of its quote reservation proportional to the
///   filled quantity, pays `value + fee`, gets the difference back and
///   receives the base quantity
/// - seller: consumes the base quantity from its reservation and receives
///   `value - fee` in quote
///
/// A limit buyer's fee is capped at what its share covers beyond the value,
/// so a fee raised after the order was reserved never costs the buyer more
/// than it locked. An order that ends up FILLED has any leftover reservation
/// refunded.
pub fn settle(
    buy: &mut Order,
    sell: &mut Order,
    proposal: &MatchProposal,
    rates: &FeeRates,
    now: Timestamp,
    journal: &mut LedgerJournal,
) -> OrderResult<Trade> {
    let quantity = proposal.quantity;
    let out_of_range = |what: &str| {
        OrderError::Overflow(format!(
            "{} of {} x {} on {}",
            what, quantity, proposal.price, buy.pair
        ))
    };
    let value = proposal
        .price
        .checked_mul(quantity)
        .ok_or_else(|| out_of_range("value"))?;

    let (buyer_role, seller_role) = if proposal.buyer_is_maker() {
        (LiquidityRole::Maker, LiquidityRole::Taker)
    } else {
        (LiquidityRole::Taker, LiquidityRole::Maker)
    };
    let buyer_fee = rates
        .fee(value, buyer_role)
        .ok_or_else(|| out_of_range("buyer fee"))?;
    let fee_seller = rates
        .fee(value, seller_role)
        .ok_or_else(|| out_of_range("seller fee"))?;

    let quote = buy.pair.quote.clone();
    let base = buy.pair.base.clone();

    // Buyer. A market buy pays exactly its cost out of the spend ceiling.
    let share = if buy.is_market() {
        None
    } else if quantity == buy.remaining_quantity {
        Some(buy.locked_funds)
    } else {
        let share = buy
            .locked_funds
            .checked_mul(quantity)
            .and_then(|scaled| scaled.checked_div(buy.remaining_quantity))
            .ok_or_else(|| out_of_range("reservation share"))?;
        Some(share)
    };
    let fee_buyer = match share {
        Some(share) => buyer_fee.min((share - value).max(Decimal::ZERO)),
        None => buyer_fee,
    };
    let cost = value
        .checked_add(fee_buyer)
        .ok_or_else(|| out_of_range("cost"))?;
    let slice = share.unwrap_or(cost);

    buy.consume_locked(slice)?;
    journal.credit(buy.user_id, &quote, slice - cost)?;
    journal.credit(buy.user_id, &base, quantity)?;

    // Seller
    sell.consume_locked(quantity)?;
    journal.credit(sell.user_id, &quote, value - fee_seller)?;

    buy.fill(quantity, now)?;
    sell.fill(quantity, now)?;

    for order in [&mut *buy, &mut *sell] {
        if order.status == OrderStatus::Filled {
            let leftover = order.take_locked();
            let currency = order.reservation_currency().clone();
            journal.credit(order.user_id, &currency, leftover)?;
        }
    }

    Ok(Trade::new(
        buy.pair.clone(),
        buy.id,
        sell.id,
        buy.user_id,
        sell.user_id,
        proposal.price,
        quantity,
        now,
    )
    .with_fees(fee_buyer, fee_seller, proposal.buyer_is_maker()))
}
