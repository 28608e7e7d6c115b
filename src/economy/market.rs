//! Continuous double-auction market
//!
//! Each commodity has its own order book: bids in a max-heap by price, asks in
//! a min-heap by price. Every `place_order` call matches immediately, so once
//! it returns the book for that commodity is never crossed.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{CompanyId, PersonId};
use crate::economy::valuation;

/// Who placed an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraderId {
    Person(PersonId),
    Company(CompanyId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// An order resting in a book
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestingOrder {
    pub price: OrderedFloat<f64>,
    pub quantity: f64,
    pub trader: TraderId,
    /// Arrival sequence, used to break price ties first-come first-served
    pub seq: u64,
}

/// Bid heap entry: highest price first, then earliest arrival
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BidEntry(pub RestingOrder);

impl PartialEq for BidEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BidEntry {}

impl PartialOrd for BidEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BidEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .cmp(&other.0.price)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

/// Ask heap entry: lowest price first, then earliest arrival
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AskEntry(pub RestingOrder);

impl PartialEq for AskEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AskEntry {}

impl PartialOrd for AskEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AskEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .cmp(&self.0.price)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

/// An executed match between a bid and an ask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub commodity: u64,
    pub quantity: f64,
    pub price: f64,
    pub buyer: TraderId,
    pub seller: TraderId,
}

/// Order book for a single commodity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBook {
    bids: BinaryHeap<BidEntry>,
    asks: BinaryHeap<AskEntry>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&RestingOrder> {
        self.bids.peek().map(|e| &e.0)
    }

    pub fn best_ask(&self) -> Option<&RestingOrder> {
        self.asks.peek().map(|e| &e.0)
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    /// True when the best bid meets or exceeds the best ask
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }

    fn push(&mut self, side: Side, order: RestingOrder) {
        match side {
            Side::Bid => self.bids.push(BidEntry(order)),
            Side::Ask => self.asks.push(AskEntry(order)),
        }
    }

    /// Execute trades until the book is uncrossed.
    ///
    /// Total on empty and one-sided books.
    fn match_crossing(&mut self, commodity: u64) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (bid, ask) = match (self.bids.peek(), self.asks.peek()) {
                (Some(bid), Some(ask)) => (bid.0, ask.0),
                _ => break,
            };
            if bid.price < ask.price {
                break;
            }

            let quantity = bid.quantity.min(ask.quantity);
            trades.push(Trade {
                commodity,
                quantity,
                price: (bid.price.0 + ask.price.0) / 2.0,
                buyer: bid.trader,
                seller: ask.trader,
            });

            if bid.quantity <= quantity {
                self.bids.pop();
            } else if let Some(mut head) = self.bids.peek_mut() {
                head.0.quantity -= quantity;
            }

            if ask.quantity <= quantity {
                self.asks.pop();
            } else if let Some(mut head) = self.asks.peek_mut() {
                head.0.quantity -= quantity;
            }
        }

        trades
    }
}

/// All order books plus price discovery state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    books: BTreeMap<u64, OrderBook>,
    prices: BTreeMap<u64, f64>,
    volume: BTreeMap<u64, f64>,
    price_history: BTreeMap<u64, VecDeque<f64>>,
    history_len: usize,
    next_seq: u64,
}

impl Default for Market {
    fn default() -> Self {
        Self::new(365)
    }
}

impl Market {
    /// Create a market remembering `history_len` trades per commodity.
    ///
    /// The base commodity "1" starts at 1.0 and "2" at its efficiency estimate.
    pub fn new(history_len: usize) -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(1, 1.0);
        prices.insert(2, valuation::efficiency(2) * 10.0);

        Self {
            books: BTreeMap::new(),
            prices,
            volume: BTreeMap::new(),
            price_history: BTreeMap::new(),
            history_len,
            next_seq: 0,
        }
    }

    /// Submit an order and immediately match the commodity's book.
    ///
    /// Orders with a non-positive quantity or a non-finite price are ignored.
    pub fn place_order(
        &mut self,
        commodity: u64,
        side: Side,
        quantity: f64,
        price: f64,
        trader: TraderId,
    ) -> Vec<Trade> {
        if !(quantity > 0.0) || !price.is_finite() || !quantity.is_finite() {
            return Vec::new();
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let book = self.books.entry(commodity).or_default();
        book.push(
            side,
            RestingOrder {
                price: OrderedFloat(price),
                quantity,
                trader,
                seq,
            },
        );
        let trades = book.match_crossing(commodity);

        for trade in &trades {
            self.record_trade(trade);
        }
        trades
    }

    fn record_trade(&mut self, trade: &Trade) {
        self.prices.insert(trade.commodity, trade.price);
        *self.volume.entry(trade.commodity).or_insert(0.0) += trade.quantity;

        let history = self.price_history.entry(trade.commodity).or_default();
        history.push_back(trade.price);
        while history.len() > self.history_len {
            history.pop_front();
        }

        tracing::debug!(
            commodity = trade.commodity,
            quantity = trade.quantity,
            price = trade.price,
            "Trade executed"
        );
    }

    /// Last traded price, or an estimate of `efficiency * 10`
    pub fn get_price(&self, commodity: u64) -> f64 {
        if let Some(&price) = self.prices.get(&commodity) {
            return price;
        }
        if valuation::weight(commodity) > 0 {
            valuation::efficiency(commodity) * 10.0
        } else {
            1.0
        }
    }

    pub fn last_price(&self, commodity: u64) -> Option<f64> {
        self.prices.get(&commodity).copied()
    }

    /// All commodities with a known price and that price
    pub fn last_prices(&self) -> &BTreeMap<u64, f64> {
        &self.prices
    }

    /// Cumulative traded quantity
    pub fn volume(&self, commodity: u64) -> f64 {
        self.volume.get(&commodity).copied().unwrap_or(0.0)
    }

    pub fn price_history(&self, commodity: u64) -> impl Iterator<Item = f64> + '_ {
        self.price_history
            .get(&commodity)
            .into_iter()
            .flat_map(|h| h.iter().copied())
    }

    pub fn book(&self, commodity: u64) -> Option<&OrderBook> {
        self.books.get(&commodity)
    }

    /// Commodities whose book is crossed (always empty after `place_order`)
    pub fn crossed_books(&self) -> Vec<u64> {
        self.books
            .iter()
            .filter(|(_, book)| book.is_crossed())
            .map(|(&commodity, _)| commodity)
            .collect()
    }

    /// Total economic activity: cumulative volume times current price
    pub fn calculate_gdp(&self) -> f64 {
        self.volume
            .iter()
            .map(|(&commodity, &qty)| qty * self.get_price(commodity))
            .sum()
    }
}
