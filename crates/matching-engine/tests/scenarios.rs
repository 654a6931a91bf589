//! End-to-end book scenarios, run against the default (tree-ladder,
//! linked-list-queue) configuration.

use matching_engine::engine::{DefaultOrderBook, ModifyOrder, NewOrder};
use matching_engine::{OrderId, Price, Side};

fn gtc(id: &str, side: Side, price: f64, qty: i64) -> NewOrder {
    NewOrder::limit(id, side, Price::new(price), qty)
}

/// S1 — simple cross, single fill: the resting bid placed *last* at the
/// best price (id 4 at 11.0) is hit before either of the two resting bids
/// at 10.0, since it's the more aggressive level, not the earlier order.
#[test]
fn s1_simple_cross_single_fill() {
    let mut book = DefaultOrderBook::new();
    assert!(book.add_order(gtc("1", Side::Buy, 10.0, 100)).is_empty());
    assert!(book.add_order(gtc("3", Side::Buy, 10.0, 100)).is_empty());
    assert!(book.add_order(gtc("4", Side::Buy, 11.0, 100)).is_empty());
    let trades = book.add_order(gtc("2", Side::Sell, 10.0, 100));

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("4"));
    assert_eq!(trades[0].bid.price, Price::new(11.0));
    assert_eq!(trades[0].bid.quantity, 100);
    assert_eq!(trades[0].ask.order_id, OrderId::new("2"));
    assert_eq!(trades[0].ask.price, Price::new(10.0));

    assert!(book.is_ask_empty());
    let bids = book.bid_levels_view();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].price, Price::new(10.0));
    assert_eq!(bids[0].quantity, 200);
}

/// S2 — FIFO within a price level: continuing S1, a second sell at 10.0
/// must match id 1 (submitted first) before id 3.
#[test]
fn s2_fifo_within_price_level() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("1", Side::Buy, 10.0, 100));
    book.add_order(gtc("3", Side::Buy, 10.0, 100));
    book.add_order(gtc("4", Side::Buy, 11.0, 100));
    book.add_order(gtc("2", Side::Sell, 10.0, 100));

    let trades = book.add_order(gtc("5", Side::Sell, 10.0, 100));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("1"));
    assert_eq!(trades[0].ask.order_id, OrderId::new("5"));

    assert!(book.is_ask_empty());
    let bids = book.bid_levels_view();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].price, Price::new(10.0));
    assert_eq!(bids[0].quantity, 100);
    assert!(book.order_exists(&OrderId::new("3")));
    assert!(!book.order_exists(&OrderId::new("1")));
}

/// S3 — an aggressor that arrives with less size than the resting maker
/// partially fills that maker and leaves it resting with reduced size.
#[test]
fn s3_aggressor_partial_fill_of_resting_maker() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("1", Side::Buy, 10.0, 100));
    book.add_order(gtc("3", Side::Buy, 10.0, 100));
    book.add_order(gtc("4", Side::Buy, 11.0, 100));
    book.add_order(gtc("2", Side::Sell, 10.0, 100));
    book.add_order(gtc("5", Side::Sell, 10.0, 100));

    let trades = book.add_order(gtc("6", Side::Sell, 9.0, 50));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid.order_id, OrderId::new("3"));
    assert_eq!(trades[0].bid.price, Price::new(10.0));
    assert_eq!(trades[0].bid.quantity, 50);
    assert_eq!(trades[0].ask.order_id, OrderId::new("6"));
    assert_eq!(trades[0].ask.price, Price::new(9.0));

    assert!(book.is_ask_empty());
    let bids = book.bid_levels_view();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].price, Price::new(10.0));
    assert_eq!(bids[0].quantity, 50);
}

#[test]
fn s4_l2_aggregation() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("A", Side::Buy, 100.0, 1000));
    book.add_order(gtc("B", Side::Buy, 100.0, 500));

    let bids = book.bid_levels_view();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].price, Price::new(100.0));
    assert_eq!(bids[0].quantity, 1500);
    assert_eq!(bids[0].volume, 150_000.0);
}

#[test]
fn s5_fill_or_kill_reject() {
    use matching_engine::engine::NewOrder;
    use matching_engine::OrderType;

    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("X", Side::Sell, 101.0, 200));

    let trades = book.add_order(
        NewOrder::limit("taker", Side::Buy, Price::new(101.0), 300).with_type(OrderType::FillOrKill),
    );
    assert!(trades.is_empty());
    assert!(!book.order_exists(&OrderId::new("taker")));
    let asks = book.ask_levels_view();
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].quantity, 200);
}

#[test]
fn s6_market_buy_consumes_two_levels() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("X", Side::Sell, 101.0, 100));
    book.add_order(gtc("Y", Side::Sell, 102.0, 50));

    let trades = book.add_order(NewOrder::market("aggr", Side::Buy, 130));
    assert_eq!(trades.len(), 2);

    assert_eq!(trades[0].bid.order_id, OrderId::new("aggr"));
    assert_eq!(trades[0].bid.price, Price::new(102.0));
    assert_eq!(trades[0].ask.order_id, OrderId::new("X"));
    assert_eq!(trades[0].ask.price, Price::new(101.0));
    assert_eq!(trades[0].ask.quantity, 100);

    assert_eq!(trades[1].bid.order_id, OrderId::new("aggr"));
    assert_eq!(trades[1].bid.price, Price::new(102.0));
    assert_eq!(trades[1].ask.order_id, OrderId::new("Y"));
    assert_eq!(trades[1].ask.price, Price::new(102.0));
    assert_eq!(trades[1].ask.quantity, 30);

    let asks = book.ask_levels_view();
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].price, Price::new(102.0));
    assert_eq!(asks[0].quantity, 20);
}

#[test]
fn add_then_cancel_returns_book_to_pre_add_state() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("resident", Side::Buy, 50.0, 10));
    assert_eq!(book.order_count(), 1);

    book.add_order(gtc("transient", Side::Buy, 9.0, 5));
    assert_eq!(book.order_count(), 2);
    book.cancel_order(&OrderId::new("transient"));
    assert_eq!(book.order_count(), 1);
    assert!(book.order_exists(&OrderId::new("resident")));
}

#[test]
fn cancel_of_unknown_id_is_idempotent() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("1", Side::Buy, 10.0, 10));
    book.cancel_order(&OrderId::new("ghost"));
    book.cancel_order(&OrderId::new("ghost"));
    assert_eq!(book.order_count(), 1);
}

#[test]
fn modify_preserves_quantity_and_restarts_priority() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("1", Side::Sell, 10.0, 100));
    book.add_order(gtc("2", Side::Sell, 10.0, 100));

    book.modify_order(
        &OrderId::new("1"),
        ModifyOrder { side: Side::Sell, price: Price::new(10.0), quantity: 100 },
    );

    let trades = book.add_order(gtc("taker", Side::Buy, 10.0, 100));
    assert_eq!(trades[0].ask.order_id, OrderId::new("2"));
}

/// Max-depth bound (§8 "Boundary behaviors"): the array ladder shape
/// accepts levels past its reserved hint by growing the backing `Vec`
/// rather than rejecting the order — `max_depth` is a capacity hint, not
/// a hard ceiling.
#[test]
fn array_ladder_grows_past_its_capacity_hint() {
    use matching_engine::engine::OrderBook;
    use matching_engine::ladder::{ArrayLadder, AskSide, BidSide, BinarySearcher};
    use matching_engine::level_queue::VecDequeQueue;

    type TinyArrayBook = OrderBook<
        VecDequeQueue,
        ArrayLadder<BidSide, VecDequeQueue, BinarySearcher>,
        ArrayLadder<AskSide, VecDequeQueue, BinarySearcher>,
    >;

    let mut book = TinyArrayBook::new();
    for i in 0..16 {
        let trades = book.add_order(gtc(&format!("bid-{i}"), Side::Buy, 10.0 + i as f64, 10));
        assert!(trades.is_empty());
    }
    assert_eq!(book.order_count(), 16);
    assert_eq!(book.bid_levels_view().len(), 16);
}

/// A universal invariant check (§8 #4): after any sequence of adds, the
/// book never leaves a residual cross between best bid and best ask.
#[test]
fn no_residual_cross_after_partial_matching() {
    let mut book = DefaultOrderBook::new();
    book.add_order(gtc("s1", Side::Sell, 100.0, 10));
    book.add_order(gtc("b1", Side::Buy, 99.0, 10));
    book.add_order(gtc("b2", Side::Buy, 100.0, 5));

    if let (Some(bid), Some(ask)) = (book.bid_levels_view().first().copied(), book.ask_levels_view().first().copied()) {
        assert!(bid.price.value() < ask.price.value());
    }
}
