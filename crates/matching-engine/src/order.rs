//! Order record: immutable identity plus mutable fill state (C2).

use crate::string_pool::InternedString;
use crate::types::{OrderId, OrderType, Price, Quantity, Side, Timestamp};

/// A resting (or about-to-rest) order.
///
/// Invariants (enforced by [`crate::l3::L3Book`] and the matching loop, never
/// by this type's own setters): `0 <= remaining_quantity <= initial_quantity`;
/// `remaining_quantity == 0` implies the order has been unlinked from the
/// book. A `Market` order stored here has already been rewritten to
/// `GoodTillCancel` at a synthetic worst price by the time it is constructed.
#[derive(Debug, Clone)]
pub struct Order {
    order_id: OrderId,
    side: Side,
    order_type: OrderType,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
    creation_time: Timestamp,
    /// Free-form client tag, interned through the shared flyweight pool
    /// (C9) since the same handful of tags tend to repeat across an
    /// order flow (e.g. a strategy name or session label).
    client_tag: Option<InternedString>,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        side: Side,
        order_type: OrderType,
        price: Price,
        initial_quantity: Quantity,
        creation_time: Timestamp,
    ) -> Self {
        Self {
            order_id,
            side,
            order_type,
            price,
            initial_quantity,
            remaining_quantity: initial_quantity,
            creation_time,
            client_tag: None,
        }
    }

    pub fn with_client_tag(mut self, tag: InternedString) -> Self {
        self.client_tag = Some(tag);
        self
    }

    pub fn id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    pub fn client_tag(&self) -> Option<&InternedString> {
        self.client_tag.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Reduce `remaining_quantity` by `qty`. Called only from the matching
    /// loop; `qty` must never exceed what's remaining.
    pub(crate) fn fill(&mut self, qty: Quantity) {
        debug_assert!(qty <= self.remaining_quantity);
        self.remaining_quantity -= qty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_reduces_remaining_not_initial() {
        let mut order = Order::new(
            OrderId::new("1"),
            Side::Buy,
            OrderType::GoodTillCancel,
            Price::new(10.0),
            100,
            Timestamp::new(0),
        );
        order.fill(40);
        assert_eq!(order.initial_quantity(), 100);
        assert_eq!(order.remaining_quantity(), 60);
        assert!(!order.is_filled());
        order.fill(60);
        assert!(order.is_filled());
    }
}
