//! Matching engine (C8): the crossing state machine that ties the L3 book
//! (C7), the L2 projection it maintains (C6), and the observer hooks (C10)
//! together behind a synchronous `OrderBook` API.

use crate::config::BookConfig;
use crate::error::BookError;
use crate::l2::L2LevelInfo;
use crate::l3::L3Book;
use crate::ladder::{AskSide, ArrayLadder, BidSide, BinarySearcher, PriceLadder, TreeLadder};
use crate::level_queue::{BTreeQueue, LevelQueue, LinkedListQueue, MultiBTreeQueue, VecDequeQueue};
use crate::observer::Observers;
use crate::order::Order;
use crate::string_pool::InternedString;
use crate::types::{OrderId, OrderType, Price, Quantity, Side, Timestamp};

/// One side of an executed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// An executed match between a resting bid and a resting ask.
///
/// **Trade-price policy (departs from the common "both legs print at the
/// maker's price" convention):** each leg prints at its own resting price —
/// the bid leg at `bid.price`, the ask leg at `ask.price`. For whichever
/// side just arrived as the aggressor, that "resting price" is its limit
/// (or, for a former `Market` order, the synthetic worst price it was
/// rewritten to before insertion); the opposite, already-resting maker leg
/// prints at the level it was sitting at. This is a deliberate
/// reproduction of the source's observed behavior (§4.C8 "Trade price
/// policy"), not the more common single maker-price convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub bid: TradeLeg,
    pub ask: TradeLeg,
}

/// A new order submission. `order_type == Market` ignores `price` (it gets
/// rewritten to the opposite side's worst resting price — §4.C8 step 2).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub client_tag: Option<InternedString>,
}

impl NewOrder {
    pub fn limit(order_id: impl Into<OrderId>, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id: order_id.into(),
            side,
            order_type: OrderType::GoodTillCancel,
            price,
            quantity,
            client_tag: None,
        }
    }

    pub fn market(order_id: impl Into<OrderId>, side: Side, quantity: Quantity) -> Self {
        Self {
            order_id: order_id.into(),
            side,
            order_type: OrderType::Market,
            price: Price::MARKET,
            quantity,
            client_tag: None,
        }
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }
}

/// Describes a cancel-replace (§4.C8 `modify`): rewrites `side`/`price`/
/// `quantity` and re-adds, restarting matching and losing FIFO priority.
#[derive(Debug, Clone)]
pub struct ModifyOrder {
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// The L3 book + matching engine (C7 + C8), generic over the per-level
/// queue shape (C4) and the two price ladders (C5). See the type aliases
/// below for ready-made instantiations of the configuration matrix in §6.
pub struct OrderBook<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    l3: L3Book<Q, LB, LA>,
    observers: Observers,
    next_tick: u64,
}

impl<Q, LB, LA> Default for OrderBook<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    fn default() -> Self {
        Self {
            l3: L3Book::default(),
            observers: Observers::default(),
            next_tick: 0,
        }
    }
}

impl<Q, LB, LA> OrderBook<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from a validated [`BookConfig`] (§10.3). `config` describes
    /// the numeric knobs (`max_depth`, `slab_size`); which concrete ladder
    /// and queue types back `Q`/`LB`/`LA` is fixed at compile time by the
    /// type alias the caller chose, so `config.ladder_shape` /
    /// `level_queue_shape` are not consulted here — they exist for an
    /// embedding application to validate and log its own choice of alias.
    pub fn with_config(config: &BookConfig) -> Result<Self, BookError> {
        config.validate()?;
        tracing::info!(
            max_depth = config.max_depth,
            ladder_shape = ?config.ladder_shape,
            level_queue_shape = ?config.level_queue_shape,
            slab_size = config.slab_size,
            "order book constructed"
        );
        Ok(Self {
            l3: L3Book::with_capacity(config.max_depth, config.slab_size),
            observers: Observers::default(),
            next_tick: 0,
        })
    }

    pub fn set_on_added(&mut self, hook: impl FnMut(&Order) + 'static) {
        self.observers.set_on_added(hook);
    }

    pub fn set_on_cancelled(&mut self, hook: impl FnMut(&Order, bool) + 'static) {
        self.observers.set_on_cancelled(hook);
    }

    pub fn set_on_matched(&mut self, hook: impl FnMut(&Order, &Order, Quantity) + 'static) {
        self.observers.set_on_matched(hook);
    }

    pub fn order_exists(&self, id: &OrderId) -> bool {
        self.l3.order_exists(id)
    }

    pub fn order_count(&self) -> usize {
        self.l3.order_count()
    }

    pub fn is_bid_empty(&self) -> bool {
        self.l3.is_bid_empty()
    }

    pub fn is_ask_empty(&self) -> bool {
        self.l3.is_ask_empty()
    }

    pub fn bid_levels_view(&self) -> Vec<L2LevelInfo> {
        self.l3.bid_levels()
    }

    pub fn ask_levels_view(&self) -> Vec<L2LevelInfo> {
        self.l3.ask_levels()
    }

    fn next_timestamp(&mut self) -> Timestamp {
        let tick = self.next_tick;
        self.next_tick += 1;
        Timestamp::new(tick)
    }

    /// Submit `request`. Returns every trade generated, possibly empty
    /// (§6, §7 — rejection is always a silent no-op, never an error value).
    pub fn add_order(&mut self, request: NewOrder) -> Vec<Trade> {
        // --- §4.C8 step 1: validation ---
        if request.quantity <= 0 {
            tracing::debug!(order_id = %request.order_id, reason = "non_positive_quantity", "order rejected");
            return Vec::new();
        }
        if request.order_type != OrderType::Market && !request.price.is_positive() {
            tracing::debug!(order_id = %request.order_id, reason = "non_positive_price", "order rejected");
            return Vec::new();
        }
        if self.l3.order_exists(&request.order_id) {
            tracing::debug!(order_id = %request.order_id, reason = "duplicate_id", "order rejected");
            return Vec::new();
        }

        let mut order_type = request.order_type;
        let mut price = request.price;

        // --- step 2: Market conversion ---
        if order_type == OrderType::Market {
            let opposite = request.side.opposite();
            match self.l3.worst_price(opposite) {
                None => {
                    tracing::debug!(order_id = %request.order_id, reason = "unroutable_market_order", "order rejected");
                    return Vec::new();
                }
                Some(worst) => {
                    price = worst;
                    order_type = OrderType::GoodTillCancel;
                }
            }
        }

        // --- step 3: FillAndKill pre-check ---
        if order_type == OrderType::FillAndKill && !self.l3.can_match(request.side, price) {
            tracing::debug!(order_id = %request.order_id, reason = "fill_and_kill_unmatchable", "order rejected");
            return Vec::new();
        }

        // --- step 4: FillOrKill pre-check ---
        if order_type == OrderType::FillOrKill
            && !self.l3.can_fully_fill(request.side, price, request.quantity)
        {
            tracing::debug!(order_id = %request.order_id, reason = "fill_or_kill_unfillable", "order rejected");
            return Vec::new();
        }

        // --- step 5: place, mirror, notify ---
        let timestamp = self.next_timestamp();
        let mut order = Order::new(
            request.order_id,
            request.side,
            order_type,
            price,
            request.quantity,
            timestamp,
        );
        if let Some(tag) = request.client_tag {
            order = order.with_client_tag(tag);
        }
        let observed = order.clone();
        self.l3.add_order(order);
        tracing::debug!(
            order_id = %observed.id(),
            side = %observed.side(),
            price = observed.price().value(),
            quantity = observed.remaining_quantity(),
            order_type = %observed.order_type(),
            "order accepted"
        );
        self.observers.order_added(&observed);

        // --- step 6: run MatchOrders until non-crossing ---
        let trades = self.run_matching();

        // --- step 7: drop any FillAndKill remnant left at top of book ---
        self.cancel_fill_and_kill_remnant(Side::Buy);
        self.cancel_fill_and_kill_remnant(Side::Sell);

        trades
    }

    /// Cancel `order_id`. No-op if unknown (§7, idempotent per §8).
    pub fn cancel_order(&mut self, order_id: &OrderId) {
        if let Some(order) = self.l3.cancel_order(order_id) {
            tracing::debug!(order_id = %order.id(), "order cancelled");
            self.observers.order_cancelled(&order, true);
        }
    }

    /// Cancel-replace (§4.C8 `modify`, §9 "Modify semantics"): removes the
    /// existing order, then re-adds with the new side/price/quantity,
    /// restarting matching and losing time priority. No-op (empty trade
    /// list) if `order_id` doesn't exist.
    pub fn modify_order(&mut self, order_id: &OrderId, modification: ModifyOrder) -> Vec<Trade> {
        let Some(existing) = self.l3.cancel_order(order_id) else {
            return Vec::new();
        };
        self.observers.order_cancelled(&existing, true);

        let request = NewOrder {
            order_id: order_id.clone(),
            side: modification.side,
            order_type: existing.order_type(),
            price: modification.price,
            quantity: modification.quantity,
            client_tag: existing.client_tag().cloned(),
        };
        self.add_order(request)
    }

    fn run_matching(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();
        loop {
            let (bid_price, ask_price) = match (self.l3.best_bid_price(), self.l3.best_ask_price()) {
                (Some(bp), Some(ap)) => (bp, ap),
                _ => break,
            };
            if bid_price.value() < ask_price.value() {
                break;
            }

            let bid_before = self.l3.best_bid().expect("crossing check guarantees a resting bid").clone();
            let ask_before = self.l3.best_ask().expect("crossing check guarantees a resting ask").clone();
            let qty = bid_before.remaining_quantity().min(ask_before.remaining_quantity());

            let mut bid_after = bid_before.clone();
            let mut ask_after = ask_before.clone();
            bid_after.fill(qty);
            ask_after.fill(qty);
            tracing::trace!(
                bid_id = %bid_before.id(),
                ask_id = %ask_before.id(),
                bid_price = bid_price.value(),
                ask_price = ask_price.value(),
                quantity = qty,
                "orders matched"
            );
            self.observers.order_matched(&bid_after, &ask_after, qty);

            let bid_outcome = self.l3.fill_best(Side::Buy, qty);
            let ask_outcome = self.l3.fill_best(Side::Sell, qty);

            trades.push(Trade {
                bid: TradeLeg {
                    order_id: bid_outcome.order_id,
                    price: bid_outcome.price,
                    quantity: qty,
                },
                ask: TradeLeg {
                    order_id: ask_outcome.order_id,
                    price: ask_outcome.price,
                    quantity: qty,
                },
            });

            // §9: the source's copy-paste bug fires onOrderCancelled(bid,
            // false) for both sides here. This rewrite fires it for
            // whichever side actually emptied.
            if bid_outcome.fully_filled {
                self.observers.order_cancelled(&bid_after, false);
            }
            if ask_outcome.fully_filled {
                self.observers.order_cancelled(&ask_after, false);
            }
        }
        trades
    }

    fn cancel_fill_and_kill_remnant(&mut self, side: Side) {
        let remnant_id = match side {
            Side::Buy => self.l3.best_bid(),
            Side::Sell => self.l3.best_ask(),
        }
        .filter(|order| order.order_type() == OrderType::FillAndKill)
        .map(|order| order.id().clone());

        if let Some(id) = remnant_id {
            self.cancel_order(&id);
        }
    }
}

// ---------------------------------------------------------------------
// Concrete instantiations of the C4 x C5 configuration matrix (§6, §9
// "Pluggable containers as generics"): one type alias per queue shape,
// each paired with both ladder shapes (tree, and the array shape with the
// binary searcher) — eight combinations in total, matching the default
// searcher choice documented in `BookConfig`.
// ---------------------------------------------------------------------

pub type LinkedListTreeBook = OrderBook<LinkedListQueue, TreeLadder<BidSide, LinkedListQueue>, TreeLadder<AskSide, LinkedListQueue>>;
pub type LinkedListArrayBook = OrderBook<
    LinkedListQueue,
    ArrayLadder<BidSide, LinkedListQueue, BinarySearcher>,
    ArrayLadder<AskSide, LinkedListQueue, BinarySearcher>,
>;
pub type DequeTreeBook = OrderBook<VecDequeQueue, TreeLadder<BidSide, VecDequeQueue>, TreeLadder<AskSide, VecDequeQueue>>;
pub type DequeArrayBook = OrderBook<
    VecDequeQueue,
    ArrayLadder<BidSide, VecDequeQueue, BinarySearcher>,
    ArrayLadder<AskSide, VecDequeQueue, BinarySearcher>,
>;
pub type OrderedSetTreeBook = OrderBook<BTreeQueue, TreeLadder<BidSide, BTreeQueue>, TreeLadder<AskSide, BTreeQueue>>;
pub type OrderedSetArrayBook = OrderBook<
    BTreeQueue,
    ArrayLadder<BidSide, BTreeQueue, BinarySearcher>,
    ArrayLadder<AskSide, BTreeQueue, BinarySearcher>,
>;
pub type MultisetTreeBook = OrderBook<MultiBTreeQueue, TreeLadder<BidSide, MultiBTreeQueue>, TreeLadder<AskSide, MultiBTreeQueue>>;
pub type MultisetArrayBook = OrderBook<
    MultiBTreeQueue,
    ArrayLadder<BidSide, MultiBTreeQueue, BinarySearcher>,
    ArrayLadder<AskSide, MultiBTreeQueue, BinarySearcher>,
>;

/// The default instantiation (`BookConfig::default()`): tree ladders over
/// doubly-linked-list per-level queues.
pub type DefaultOrderBook = LinkedListTreeBook;

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(id: &str, price: f64, qty: Quantity) -> NewOrder {
        NewOrder::limit(id, Side::Buy, Price::new(price), qty)
    }

    fn sell(id: &str, price: f64, qty: Quantity) -> NewOrder {
        NewOrder::limit(id, Side::Sell, Price::new(price), qty)
    }

    #[test]
    fn simple_cross_single_fill() {
        let mut book = DefaultOrderBook::new();
        assert!(book.add_order(buy("1", 10.0, 100)).is_empty());
        assert!(book.add_order(buy("3", 10.0, 100)).is_empty());
        assert!(book.add_order(buy("4", 11.0, 100)).is_empty());
        let trades = book.add_order(sell("2", 10.0, 100));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].bid.order_id, OrderId::new("4"));
        assert_eq!(trades[0].bid.price, Price::new(11.0));
        assert_eq!(trades[0].ask.order_id, OrderId::new("2"));
        assert_eq!(trades[0].ask.price, Price::new(10.0));
        assert_eq!(trades[0].ask.quantity, 100);

        assert!(book.is_ask_empty());
        let bids = book.bid_levels_view();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].price, Price::new(10.0));
        assert_eq!(bids[0].quantity, 200);
    }

    #[test]
    fn market_buy_consumes_two_levels() {
        let mut book = DefaultOrderBook::new();
        book.add_order(sell("X", 101.0, 100));
        book.add_order(sell("Y", 102.0, 50));

        let trades = book.add_order(NewOrder::market("aggr", Side::Buy, 130));
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].ask.order_id, OrderId::new("X"));
        assert_eq!(trades[0].ask.price, Price::new(101.0));
        assert_eq!(trades[0].ask.quantity, 100);
        assert_eq!(trades[0].bid.price, Price::new(102.0));

        assert_eq!(trades[1].ask.order_id, OrderId::new("Y"));
        assert_eq!(trades[1].ask.price, Price::new(102.0));
        assert_eq!(trades[1].ask.quantity, 30);

        let asks = book.ask_levels_view();
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].price, Price::new(102.0));
        assert_eq!(asks[0].quantity, 20);
    }

    #[test]
    fn fill_or_kill_rejects_when_it_cannot_fully_fill() {
        let mut book = DefaultOrderBook::new();
        book.add_order(sell("X", 101.0, 200));
        let trades = book.add_order(NewOrder::limit("Y", Side::Buy, Price::new(101.0), 300).with_type(OrderType::FillOrKill));
        assert!(trades.is_empty());
        assert!(!book.order_exists(&OrderId::new("Y")));
        assert_eq!(book.ask_levels_view()[0].quantity, 200);
    }

    #[test]
    fn fill_and_kill_partial_leaves_no_remnant() {
        let mut book = DefaultOrderBook::new();
        book.add_order(sell("X", 101.0, 50));
        let trades = book.add_order(NewOrder::limit("Y", Side::Buy, Price::new(101.0), 100).with_type(OrderType::FillAndKill));
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].ask.quantity, 50);
        assert!(!book.order_exists(&OrderId::new("Y")));
        assert!(book.is_ask_empty());
    }

    #[test]
    fn market_order_on_empty_opposite_side_is_rejected() {
        let mut book = DefaultOrderBook::new();
        let trades = book.add_order(NewOrder::market("a", Side::Buy, 10));
        assert!(trades.is_empty());
        assert!(!book.order_exists(&OrderId::new("a")));
    }

    #[test]
    fn cancel_then_add_round_trips_book_state() {
        let mut book = DefaultOrderBook::new();
        book.add_order(buy("1", 10.0, 100));
        assert_eq!(book.order_count(), 1);
        book.cancel_order(&OrderId::new("1"));
        assert_eq!(book.order_count(), 0);
        assert!(book.is_bid_empty());
    }

    #[test]
    fn cancel_of_unknown_id_is_a_no_op() {
        let mut book = DefaultOrderBook::new();
        book.cancel_order(&OrderId::new("ghost"));
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn modify_restarts_time_priority() {
        let mut book = DefaultOrderBook::new();
        book.add_order(sell("1", 10.0, 100));
        book.add_order(sell("2", 10.0, 100));
        book.modify_order(&OrderId::new("1"), ModifyOrder { side: Side::Sell, price: Price::new(10.0), quantity: 100 });

        // order 1 lost priority to order 2 by re-adding, so the first buy
        // to cross should match order 2 first.
        let trades = book.add_order(buy("taker", 10.0, 100));
        assert_eq!(trades[0].ask.order_id, OrderId::new("2"));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut book = DefaultOrderBook::new();
        book.add_order(buy("1", 10.0, 100));
        let trades = book.add_order(buy("1", 11.0, 50));
        assert!(trades.is_empty());
        assert_eq!(book.order_count(), 1);
    }
}
