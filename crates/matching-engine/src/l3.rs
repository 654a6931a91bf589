//! L3 book (C7): per-order placement, id lookup, and best/worst level
//! access, generic over the per-level queue shape (C4) and the two price
//! ladders (C5) — one per side, since each side orders prices oppositely.
//!
//! Owns every `Order` record via the allocator (C3); the id index and the
//! embedded L2 projection (C6) hold only non-owning references (§3
//! "Ownership").

use crate::allocator::{OrderAllocator, OrderHandle};
use crate::l2::{L2Book, L2LevelInfo};
use crate::ladder::{AskSide, BidSide, PriceLadder};
use crate::level_queue::LevelQueue;
use crate::order::Order;
use crate::types::{OrderId, Price, Quantity, Side};
use std::collections::HashMap;

struct IndexEntry<H> {
    side: Side,
    price: Price,
    order: OrderHandle,
    queue_handle: H,
}

/// Outcome of filling the resting order at the front of a level's queue.
pub struct FillOutcome {
    pub order_id: OrderId,
    pub price: Price,
    pub filled_qty: Quantity,
    pub fully_filled: bool,
}

pub struct L3Book<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q> + Default,
    LA: PriceLadder<AskSide, Q> + Default,
{
    bids: LB,
    asks: LA,
    allocator: OrderAllocator,
    index: HashMap<OrderId, IndexEntry<Q::Handle>>,
    l2: L2Book,
}

impl<Q, LB, LA> Default for L3Book<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q> + Default,
    LA: PriceLadder<AskSide, Q> + Default,
{
    fn default() -> Self {
        Self {
            bids: LB::default(),
            asks: LA::default(),
            allocator: OrderAllocator::default(),
            index: HashMap::new(),
            l2: L2Book::new(),
        }
    }
}

impl<Q, LB, LA> L3Book<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q> + Default,
    LA: PriceLadder<AskSide, Q> + Default,
{
    pub fn with_allocator(allocator: OrderAllocator) -> Self {
        Self {
            bids: LB::default(),
            asks: LA::default(),
            allocator,
            index: HashMap::new(),
            l2: L2Book::new(),
        }
    }

    /// Construct with `max_depth` passed through to each side's ladder as a
    /// reserved-capacity hint (meaningful only for the array shape; ignored
    /// by the tree shape — see [`PriceLadder::with_capacity_hint`]).
    pub fn with_capacity(max_depth: usize, slab_size: usize) -> Self {
        Self {
            bids: LB::with_capacity_hint(max_depth),
            asks: LA::with_capacity_hint(max_depth),
            allocator: OrderAllocator::new(slab_size),
            index: HashMap::new(),
            l2: L2Book::new(),
        }
    }

    pub fn order_exists(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Place `order` into the book. Returns `false` (no-op) if its id
    /// already exists (§7 "Duplicate id").
    pub fn add_order(&mut self, order: Order) -> bool {
        if self.index.contains_key(order.id()) {
            return false;
        }
        let id = order.id().clone();
        let side = order.side();
        let price = order.price();
        let qty = order.remaining_quantity();
        let timestamp = order.creation_time();
        let order_handle = self.allocator.allocate(order);

        let queue_handle = match side {
            Side::Buy => {
                self.bids.insert(price);
                self.bids.get_mut(price).unwrap().queue.insert(timestamp, order_handle)
            }
            Side::Sell => {
                self.asks.insert(price);
                self.asks.get_mut(price).unwrap().queue.insert(timestamp, order_handle)
            }
        };

        self.index.insert(
            id,
            IndexEntry {
                side,
                price,
                order: order_handle,
                queue_handle,
            },
        );
        self.l2.add(side, price, qty);
        true
    }

    /// Remove `id` entirely: unlinks it from its level's queue, erases the
    /// level if that empties it, mirrors the cancellation into L2, and
    /// returns the freed `Order`.
    pub fn cancel_order(&mut self, id: &OrderId) -> Option<Order> {
        let entry = self.index.remove(id)?;
        let level_empty = match entry.side {
            Side::Buy => {
                let level = self.bids.get_mut(entry.price)?;
                level.queue.remove(entry.queue_handle);
                level.queue.is_empty()
            }
            Side::Sell => {
                let level = self.asks.get_mut(entry.price)?;
                level.queue.remove(entry.queue_handle);
                level.queue.is_empty()
            }
        };
        if level_empty {
            match entry.side {
                Side::Buy => {
                    self.bids.remove(entry.price);
                }
                Side::Sell => {
                    self.asks.remove(entry.price);
                }
            }
        }
        let order = self.allocator.deallocate(entry.order)?;
        self.l2.cancel(entry.side, entry.price, order.remaining_quantity());
        Some(order)
    }

    pub fn best_bid(&self) -> Option<&Order> {
        let level = self.bids.best()?;
        let handle = level.queue.first()?;
        self.allocator.get(handle)
    }

    pub fn best_ask(&self) -> Option<&Order> {
        let level = self.asks.best()?;
        let handle = level.queue.first()?;
        self.allocator.get(handle)
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        self.bids.best().map(|l| l.price)
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.asks.best().map(|l| l.price)
    }

    /// Price of the deepest (least aggressive) resting level on `side`,
    /// used to synthesize the crossing price for a `Market` order
    /// (§4.C8 step 2).
    pub fn worst_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.worst().map(|l| l.price),
            Side::Sell => self.asks.worst().map(|l| l.price),
        }
    }

    pub fn is_bid_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn is_ask_empty(&self) -> bool {
        self.asks.is_empty()
    }

    /// Can any resting order on `side` cross a new order limited at
    /// `price`? Used by the `FillAndKill` pre-check (§4.C8 step 3).
    pub fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.asks.best().map(|l| l.price.value() <= price.value()).unwrap_or(false),
            Side::Sell => self.bids.best().map(|l| l.price.value() >= price.value()).unwrap_or(false),
        }
    }

    /// Walk the opposite side's L2 depth from best through `price`,
    /// accumulating `remaining_quantity` until it reaches `qty` — the
    /// `FillOrKill` pre-check (§4.C8 step 4). Always uses remaining
    /// quantity, never initial (§9 "FillOrKill variants").
    pub fn can_fully_fill(&self, side: Side, price: Price, qty: Quantity) -> bool {
        let opposite = side.opposite();
        let mut accumulated: Quantity = 0;
        let (lo, hi) = match side {
            Side::Buy => (Price::new(f64::MIN), price),
            Side::Sell => (price, Price::new(f64::MAX)),
        };
        self.l2.for_each_level(opposite, lo, hi, |level| {
            accumulated += level.quantity;
            accumulated < qty
        });
        accumulated >= qty
    }

    /// Fill `qty` against the order resting at the front of `side`'s best
    /// level. Panics if there is no such order — callers must check
    /// `is_bid_empty`/`is_ask_empty` first; this is an internal primitive
    /// used only from the matching loop (§4.C8 `MatchOrders`).
    pub fn fill_best(&mut self, side: Side, qty: Quantity) -> FillOutcome {
        let (price, handle) = match side {
            Side::Buy => {
                let level = self.bids.best().expect("fill_best called on empty bid side");
                (level.price, level.queue.first().expect("non-empty level has a front order"))
            }
            Side::Sell => {
                let level = self.asks.best().expect("fill_best called on empty ask side");
                (level.price, level.queue.first().expect("non-empty level has a front order"))
            }
        };

        let order = self.allocator.get_mut(handle).expect("queue handle must resolve");
        order.fill(qty);
        let order_id = order.id().clone();
        let fully_filled = order.is_filled();
        self.l2.cancel(side, price, qty);

        if fully_filled {
            let queue_handle = self.index.get(&order_id).expect("order must be indexed").queue_handle;
            match side {
                Side::Buy => {
                    let level = self.bids.get_mut(price).unwrap();
                    level.queue.remove(queue_handle);
                }
                Side::Sell => {
                    let level = self.asks.get_mut(price).unwrap();
                    level.queue.remove(queue_handle);
                }
            }
            self.index.remove(&order_id);
            self.allocator.deallocate(handle);
            self.remove_level_if_empty(side, price);
        }

        FillOutcome {
            order_id,
            price,
            filled_qty: qty,
            fully_filled,
        }
    }

    /// Erase `side`'s best level if its queue is now empty. Called by the
    /// matching loop after draining a level (§4.C8 `MatchOrders`).
    pub fn remove_level_if_empty(&mut self, side: Side, price: Price) {
        let empty = match side {
            Side::Buy => self.bids.get(price).map(|l| l.queue.is_empty()),
            Side::Sell => self.asks.get(price).map(|l| l.queue.is_empty()),
        };
        if empty == Some(true) {
            match side {
                Side::Buy => {
                    self.bids.remove(price);
                }
                Side::Sell => {
                    self.asks.remove(price);
                }
            }
        }
    }

    pub fn bid_levels(&self) -> Vec<L2LevelInfo> {
        self.l2.levels(Side::Buy)
    }

    pub fn ask_levels(&self) -> Vec<L2LevelInfo> {
        self.l2.levels(Side::Sell)
    }
}
