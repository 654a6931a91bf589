//! An in-memory limit order book with price-time priority matching.
//!
//! The book maintains two parallel views of the same state — an L3 view
//! keyed by individual order (`l3`) and an aggregated L2 depth view
//! (`l2`) kept in lock-step — behind the `OrderBook` engine in [`engine`].
//! Both the per-price-level queue shape (C4) and the price ladder shape
//! (C5) are pluggable via generics rather than trait objects, so a caller
//! picks a concrete instantiation at compile time; [`engine`] exports
//! type aliases for the combinations the default configuration surface
//! (see [`config::BookConfig`]) can describe.
//!
//! ```
//! use matching_engine::engine::{DefaultOrderBook, NewOrder};
//! use matching_engine::types::{Price, Side};
//!
//! let mut book = DefaultOrderBook::new();
//! book.add_order(NewOrder::limit("resting-sell", Side::Sell, Price::new(101.5), 100));
//! let trades = book.add_order(NewOrder::limit("aggressive-buy", Side::Buy, Price::new(101.5), 40));
//! assert_eq!(trades.len(), 1);
//! ```

pub mod allocator;
pub mod config;
pub mod engine;
pub mod error;
pub mod l2;
pub mod l3;
pub mod ladder;
pub mod level_queue;
pub mod observer;
pub mod order;
pub mod string_pool;
pub mod types;

pub use config::BookConfig;
pub use engine::{DefaultOrderBook, ModifyOrder, NewOrder, OrderBook, Trade, TradeLeg};
pub use error::BookError;
pub use order::Order;
pub use types::{OrderId, OrderType, Price, Quantity, Side, Timestamp, Volume};
