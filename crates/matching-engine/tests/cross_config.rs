//! Confirms the eight ladder/queue configuration combinations (§9 "Pluggable
//! containers as generics", §10.4) are behaviorally equivalent: the matching
//! *semantics* must not depend on which concrete container realizes the
//! abstraction, only its performance characteristics do.

use matching_engine::engine::{
    DequeArrayBook, DequeTreeBook, LinkedListArrayBook, LinkedListTreeBook, MultisetArrayBook,
    MultisetTreeBook, NewOrder, OrderBook, OrderedSetArrayBook, OrderedSetTreeBook,
};
use matching_engine::ladder::{AskSide, BidSide, PriceLadder};
use matching_engine::level_queue::LevelQueue;
use matching_engine::{OrderId, Price, Side};

fn gtc(id: &str, side: Side, price: f64, qty: i64) -> NewOrder {
    NewOrder::limit(id, side, Price::new(price), qty)
}

/// Runs the S1–S3 scenario chain (price-time priority, FIFO within a level,
/// partial-fill remnants) against one concrete `OrderBook` instantiation and
/// asserts the same outcomes `tests/scenarios.rs` asserts for the default
/// configuration.
fn exercise_price_time_priority<Q, LB, LA>()
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    let mut book: OrderBook<Q, LB, LA> = OrderBook::new();

    assert!(book.add_order(gtc("1", Side::Buy, 10.0, 100)).is_empty());
    assert!(book.add_order(gtc("3", Side::Buy, 10.0, 100)).is_empty());
    assert!(book.add_order(gtc("4", Side::Buy, 11.0, 100)).is_empty());

    // S1: the more aggressive 11.0 level trades before either order resting
    // at 10.0, regardless of submission order.
    let trades = book.add_order(gtc("2", Side::Sell, 10.0, 100));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("4"));
    assert_eq!(trades[0].ask.order_id, OrderId::new("2"));
    assert!(book.is_ask_empty());

    // S2: within the 10.0 level, order 1 (earlier arrival) trades before 3.
    let trades = book.add_order(gtc("5", Side::Sell, 10.0, 100));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("1"));
    assert!(book.order_exists(&OrderId::new("3")));
    assert!(!book.order_exists(&OrderId::new("1")));

    // S3: a smaller aggressor partially fills the remaining maker (3),
    // which keeps resting with reduced size rather than being removed.
    let trades = book.add_order(gtc("6", Side::Sell, 9.0, 50));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("3"));
    assert_eq!(trades[0].bid.quantity, 50);
    let bids = book.bid_levels_view();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].quantity, 50);
}

/// Market-order routing (S6) must also be container-shape independent: the
/// synthetic worst-price crossing price and per-leg trade prices must agree
/// across every backend.
fn exercise_market_order_routing<Q, LB, LA>()
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    let mut book: OrderBook<Q, LB, LA> = OrderBook::new();
    book.add_order(gtc("X", Side::Sell, 101.0, 100));
    book.add_order(gtc("Y", Side::Sell, 102.0, 50));

    let trades = book.add_order(NewOrder::market("aggr", Side::Buy, 130));
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].ask.order_id, OrderId::new("X"));
    assert_eq!(trades[0].bid.price, Price::new(102.0));
    assert_eq!(trades[1].ask.order_id, OrderId::new("Y"));
    assert_eq!(trades[1].ask.quantity, 30);

    let asks = book.ask_levels_view();
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].quantity, 20);
}

macro_rules! cross_config_tests {
    ($($name:ident => $alias:ty),+ $(,)?) => {
        $(
            mod $name {
                use super::*;

                #[test]
                fn price_time_priority() {
                    exercise_price_time_priority::<
                        <$alias as AliasParts>::Queue,
                        <$alias as AliasParts>::Bids,
                        <$alias as AliasParts>::Asks,
                    >();
                }

                #[test]
                fn market_order_routing() {
                    exercise_market_order_routing::<
                        <$alias as AliasParts>::Queue,
                        <$alias as AliasParts>::Bids,
                        <$alias as AliasParts>::Asks,
                    >();
                }
            }
        )+
    };
}

/// Extracts the three generic parameters back out of an `OrderBook<Q, LB,
/// LA>` type alias so the macro above can re-parametrize the two exercise
/// functions without repeating each alias's full generic argument list.
trait AliasParts {
    type Queue: LevelQueue;
    type Bids: PriceLadder<BidSide, Self::Queue>;
    type Asks: PriceLadder<AskSide, Self::Queue>;
}

impl<Q, LB, LA> AliasParts for OrderBook<Q, LB, LA>
where
    Q: LevelQueue,
    LB: PriceLadder<BidSide, Q>,
    LA: PriceLadder<AskSide, Q>,
{
    type Queue = Q;
    type Bids = LB;
    type Asks = LA;
}

cross_config_tests! {
    linked_list_tree => LinkedListTreeBook,
    linked_list_array => LinkedListArrayBook,
    deque_tree => DequeTreeBook,
    deque_array => DequeArrayBook,
    ordered_set_tree => OrderedSetTreeBook,
    ordered_set_array => OrderedSetArrayBook,
    multiset_tree => MultisetTreeBook,
    multiset_array => MultisetArrayBook,
}
