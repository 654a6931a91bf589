//! Observers (C10): synchronous callbacks fired at precise points in the
//! matching engine. Observers must not re-enter the book and must not
//! retain `Order` references past the callback (§4.C10) — enforced here by
//! only ever handing them a `&Order` borrowed for the duration of the call.

use crate::order::Order;
use crate::types::Quantity;

type AddedHook = Box<dyn FnMut(&Order)>;
type CancelledHook = Box<dyn FnMut(&Order, bool)>;
type MatchedHook = Box<dyn FnMut(&Order, &Order, Quantity)>;

/// Holds the three optional hooks an [`crate::engine::OrderBook`] invokes.
/// Registered individually via `set_on_added`/`set_on_cancelled`/
/// `set_on_matched` rather than one monolithic trait, matching §6's surface.
#[derive(Default)]
pub struct Observers {
    on_added: Option<AddedHook>,
    on_cancelled: Option<CancelledHook>,
    on_matched: Option<MatchedHook>,
}

impl Observers {
    pub fn set_on_added(&mut self, hook: impl FnMut(&Order) + 'static) {
        self.on_added = Some(Box::new(hook));
    }

    pub fn set_on_cancelled(&mut self, hook: impl FnMut(&Order, bool) + 'static) {
        self.on_cancelled = Some(Box::new(hook));
    }

    pub fn set_on_matched(&mut self, hook: impl FnMut(&Order, &Order, Quantity) + 'static) {
        self.on_matched = Some(Box::new(hook));
    }

    /// Fired after an order is successfully inserted into L3.
    pub(crate) fn order_added(&mut self, order: &Order) {
        if let Some(hook) = self.on_added.as_mut() {
            hook(order);
        }
    }

    /// Fired after `order` is unlinked from L3. `update_l2` tells the
    /// caller whether the engine already mirrored the removal into L2
    /// itself (true for a plain cancel) or whether the observer is being
    /// notified about a removal L2 has already separately accounted for
    /// (false — e.g. a full-fill unlink inside the matching loop, which
    /// mirrors L2 via the per-fill `cancel` call instead).
    pub(crate) fn order_cancelled(&mut self, order: &Order, update_l2: bool) {
        if let Some(hook) = self.on_cancelled.as_mut() {
            hook(order, update_l2);
        }
    }

    /// Fired after each partial or full fill, before queue unlinking.
    pub(crate) fn order_matched(&mut self, bid: &Order, ask: &Order, qty: Quantity) {
        if let Some(hook) = self.on_matched.as_mut() {
            hook(bid, ask, qty);
        }
    }
}
