//! Primitive types shared by every layer of the book (C1).

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Decimal-valued price. Backed by `f64` via `OrderedFloat` so it can key a
/// `BTreeMap` and compare totally, matching the teacher's use of
/// `ordered_float` for the same purpose in the original price ladders.
///
/// A live order's price must be `> 0`; `Price::MARKET` is the sentinel used
/// before a `Market` order is routed (see [`crate::engine::OrderBook::add_order`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(pub OrderedFloat<f64>);

impl Price {
    /// Sentinel for a `Market` order prior to being rewritten to the
    /// opposite side's worst price. Never valid on a resting order.
    pub const MARKET: Price = Price(OrderedFloat(0.0));

    pub fn new(value: f64) -> Self {
        Self(OrderedFloat(value))
    }

    pub fn value(&self) -> f64 {
        self.0 .0
    }

    pub fn is_positive(&self) -> bool {
        self.0 .0 > 0.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 .0)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Signed quantity. Must be `> 0` at add-time and is monotonically
/// non-increasing for the lifetime of an order.
pub type Quantity = i64;

/// `price * quantity`, kept as a running sum per L2 level.
pub type Volume = f64;

pub fn volume_of(price: Price, quantity: Quantity) -> Volume {
    price.value() * quantity as f64
}

/// Opaque, unique order identifier. Cheap to clone (`Arc<str>`) since it is
/// carried by value through the id index, per-level queues, and every
/// `Trade` leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(Arc<str>);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Time-in-force / order type.
///
/// `Market` never rests on the book under this variant: [`OrderBook::add_order`]
/// rewrites it to `GoodTillCancel` at a synthetic worst price before placement
/// (§4.C8 of the design). The variant still needs to exist so a caller can
/// *submit* a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    GoodTillCancel,
    Market,
    FillAndKill,
    FillOrKill,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::GoodTillCancel => "good_till_cancel",
            OrderType::Market => "market",
            OrderType::FillAndKill => "fill_and_kill",
            OrderType::FillOrKill => "fill_or_kill",
        };
        write!(f, "{s}")
    }
}

/// Monotonic high-resolution instant assigned at order creation. A thin
/// wrapper over a `u64` tick counter rather than `std::time::Instant` so it
/// stays `Copy + Ord + Serialize` and can be used as a `BTreeMap` key by the
/// ordered-set/multiset level-queue variants (§4.C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn new(tick: u64) -> Self {
        Self(tick)
    }
}
