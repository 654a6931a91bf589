//! L2 aggregated depth book (C6): a consistent projection of L3 carrying
//! per-price `(quantity, volume)` totals. Mutated in lock-step by the L3
//! book and the matching loop; never mutated directly by a client.

use crate::types::{volume_of, Price, Quantity, Side, Volume};
use std::collections::BTreeMap;

/// `{price, quantity, volume}` as exposed by [`crate::engine::OrderBook::bid_levels_view`]
/// / `ask_levels_view`. Invariant: `quantity > 0` and `volume == price *
/// quantity` for every level this type is handed out for (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L2LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
    pub volume: Volume,
}

#[derive(Default, Clone)]
struct Aggregate {
    quantity: Quantity,
    volume: Volume,
}

/// Two independent `price -> (qty, vol)` maps, one per side. Kept as plain
/// `BTreeMap`s rather than sharing the C5 ladder abstraction: L2 never needs
/// per-order FIFO ordering, only aggregate totals, and a hash/tree index
/// keyed directly on the raw price bits is simpler than threading the
/// `LevelQueue` generic through a second, order-less book.
#[derive(Default)]
pub struct L2Book {
    bids: BTreeMap<ordered_float::OrderedFloat<f64>, Aggregate>,
    asks: BTreeMap<ordered_float::OrderedFloat<f64>, Aggregate>,
}

impl L2Book {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_map(&mut self, side: Side) -> &mut BTreeMap<ordered_float::OrderedFloat<f64>, Aggregate> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Add `qty` at `price`, creating the level if absent. No-op (per §4.C6
    /// "Validation") if `price` or `qty` is non-positive.
    pub fn add(&mut self, side: Side, price: Price, qty: Quantity) {
        if !price.is_positive() || qty <= 0 {
            return;
        }
        let entry = self.side_map(side).entry(ordered_float::OrderedFloat(price.value())).or_default();
        entry.quantity += qty;
        entry.volume += volume_of(price, qty);
    }

    /// Remove `qty` at `price`; erases the level once `quantity <= 0`. A
    /// no-op if the level doesn't exist or the inputs are non-positive.
    pub fn cancel(&mut self, side: Side, price: Price, qty: Quantity) {
        if !price.is_positive() || qty <= 0 {
            return;
        }
        let key = ordered_float::OrderedFloat(price.value());
        let map = self.side_map(side);
        if let Some(entry) = map.get_mut(&key) {
            entry.quantity -= qty;
            entry.volume -= volume_of(price, qty);
            if entry.quantity <= 0 {
                map.remove(&key);
            }
        }
    }

    pub fn is_empty(&self, side: Side) -> bool {
        match side {
            Side::Buy => self.bids.is_empty(),
            Side::Sell => self.asks.is_empty(),
        }
    }

    pub fn best_level(&self, side: Side) -> Option<L2LevelInfo> {
        match side {
            Side::Buy => self.bids.iter().next_back(),
            Side::Sell => self.asks.iter().next(),
        }
        .map(|(price, agg)| L2LevelInfo {
            price: Price::new(price.0),
            quantity: agg.quantity,
            volume: agg.volume,
        })
    }

    /// Best-first iteration within the inclusive price bounds
    /// `[p_min, p_max]`, stopping early when `cb` returns `false`.
    pub fn for_each_level(&self, side: Side, p_min: Price, p_max: Price, mut cb: impl FnMut(L2LevelInfo) -> bool) {
        let iter: Box<dyn Iterator<Item = (&ordered_float::OrderedFloat<f64>, &Aggregate)>> = match side {
            Side::Buy => Box::new(self.bids.iter().rev()),
            Side::Sell => Box::new(self.asks.iter()),
        };
        for (price, agg) in iter {
            let price = Price::new(price.0);
            if price.value() < p_min.value() || price.value() > p_max.value() {
                continue;
            }
            let info = L2LevelInfo {
                price,
                quantity: agg.quantity,
                volume: agg.volume,
            };
            if !cb(info) {
                break;
            }
        }
    }

    /// Best-first snapshot of every level on `side`.
    pub fn levels(&self, side: Side) -> Vec<L2LevelInfo> {
        let mut out = Vec::new();
        self.for_each_level(side, Price::new(f64::MIN), Price::new(f64::MAX), |info| {
            out.push(info);
            true
        });
        out
    }
}
