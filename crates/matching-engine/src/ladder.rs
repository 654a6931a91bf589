//! Price ladder abstraction (C5): uniform find/insert/erase over a
//! tree-ordered map or a sorted contiguous array, each parametrized by the
//! side (bids descend, asks ascend) and, for the array shape, by a
//! `Searcher` policy (§4.C5).

use crate::level_queue::LevelQueue;
use crate::types::Price;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// A materialized price level: the FIFO queue of resting orders at that
/// price. Lazily created on first order, erased on transition to empty
/// (§3 "Lifecycles").
pub struct Level<Q: LevelQueue> {
    pub price: Price,
    pub queue: Q,
}

impl<Q: LevelQueue> Level<Q> {
    fn new(price: Price) -> Self {
        Self {
            price,
            queue: Q::default(),
        }
    }
}

/// Per-side price ranking: higher rank is always the better (more
/// aggressive / closer to top-of-book) price, regardless of whether bids
/// sort descending or asks ascending in absolute terms. Every ladder shape
/// is built on top of this single number so the tree and array
/// implementations share one notion of "best".
pub trait LadderSide: Default + Copy + Eq + std::fmt::Debug + 'static {
    fn rank(price: Price) -> OrderedFloat<f64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BidSide;
impl LadderSide for BidSide {
    fn rank(price: Price) -> OrderedFloat<f64> {
        OrderedFloat(price.value())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AskSide;
impl LadderSide for AskSide {
    fn rank(price: Price) -> OrderedFloat<f64> {
        OrderedFloat(-price.value())
    }
}

/// Outcome of locating a price within a ladder.
pub enum Located {
    /// The price already has a level.
    Found,
    /// No level at that price yet; a new one would be inserted here to
    /// keep the backing store's required ordering.
    Absent,
}

/// Uniform contract over both ladder shapes.
pub trait PriceLadder<S: LadderSide, Q: LevelQueue>: Default {
    /// Construct with a reserved-capacity hint (§4.C5 `max_depth`). The
    /// tree shape has no notion of reserved capacity and ignores it; only
    /// [`ArrayLadder`] actually reserves.
    fn with_capacity_hint(_hint: usize) -> Self
    where
        Self: Sized,
    {
        Self::default()
    }

    fn locate(&self, price: Price) -> Located;
    /// Insert an (empty) level at `price`. No-op if one already exists.
    fn insert(&mut self, price: Price);
    fn remove(&mut self, price: Price) -> Option<Level<Q>>;
    fn get(&self, price: Price) -> Option<&Level<Q>>;
    fn get_mut(&mut self, price: Price) -> Option<&mut Level<Q>>;
    /// Best (most aggressive) level, if any.
    fn best(&self) -> Option<&Level<Q>>;
    /// Worst (least aggressive, deepest) level, if any. Used to synthesize
    /// the crossing price for a `Market` order (§4.C8 step 2).
    fn worst(&self) -> Option<&Level<Q>>;
    fn is_empty(&self) -> bool;
    fn len(&self) -> usize;
    /// Best-first iteration over every resting level.
    fn iter_best_first(&self) -> Box<dyn Iterator<Item = &Level<Q>> + '_>;
}

/// Key used by [`TreeLadder`]'s `BTreeMap`: ordered so that ascending key
/// order (what `BTreeMap::iter` naturally gives) visits the best price
/// first, for either side, via [`LadderSide::rank`].
#[derive(Debug, Clone, Copy)]
struct TreeKey<S: LadderSide>(Price, PhantomData<S>);

impl<S: LadderSide> TreeKey<S> {
    fn new(price: Price) -> Self {
        Self(price, PhantomData)
    }
}

impl<S: LadderSide> PartialEq for TreeKey<S> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<S: LadderSide> Eq for TreeKey<S> {}
impl<S: LadderSide> PartialOrd for TreeKey<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<S: LadderSide> Ord for TreeKey<S> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Descending rank => ascending key order visits the best rank first.
        S::rank(other.0).cmp(&S::rank(self.0))
    }
}

/// Tree-ordered map shape (§4.C5 variant 1). `begin()` (here,
/// `iter_best_first().next()`) is O(1); `find` is O(log n).
pub struct TreeLadder<S: LadderSide, Q: LevelQueue> {
    levels: BTreeMap<TreeKey<S>, Level<Q>>,
}

impl<S: LadderSide, Q: LevelQueue> Default for TreeLadder<S, Q> {
    fn default() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }
}

impl<S: LadderSide, Q: LevelQueue> PriceLadder<S, Q> for TreeLadder<S, Q> {
    fn locate(&self, price: Price) -> Located {
        if self.levels.contains_key(&TreeKey::new(price)) {
            Located::Found
        } else {
            Located::Absent
        }
    }

    fn insert(&mut self, price: Price) {
        self.levels
            .entry(TreeKey::new(price))
            .or_insert_with(|| Level::new(price));
    }

    fn remove(&mut self, price: Price) -> Option<Level<Q>> {
        self.levels.remove(&TreeKey::new(price))
    }

    fn get(&self, price: Price) -> Option<&Level<Q>> {
        self.levels.get(&TreeKey::new(price))
    }

    fn get_mut(&mut self, price: Price) -> Option<&mut Level<Q>> {
        self.levels.get_mut(&TreeKey::new(price))
    }

    fn best(&self) -> Option<&Level<Q>> {
        self.levels.values().next()
    }

    fn worst(&self) -> Option<&Level<Q>> {
        self.levels.values().next_back()
    }

    fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn len(&self) -> usize {
        self.levels.len()
    }

    fn iter_best_first(&self) -> Box<dyn Iterator<Item = &Level<Q>> + '_> {
        Box::new(self.levels.values())
    }
}

/// Searcher policy for [`ArrayLadder`] (§4.C5). All three must return the
/// first index whose rank is `>=` the target's rank (a lower-bound probe);
/// an exact hit is then confirmed by the caller comparing prices.
pub trait Searcher: Default {
    fn lower_bound(entries: &[(OrderedFloat<f64>, Price)], target: OrderedFloat<f64>) -> usize;
}

#[derive(Default)]
pub struct BinarySearcher;
impl Searcher for BinarySearcher {
    fn lower_bound(entries: &[(OrderedFloat<f64>, Price)], target: OrderedFloat<f64>) -> usize {
        entries.partition_point(|(rank, _)| *rank < target)
    }
}

/// Halving loop without the early-return branch a textbook binary search
/// takes on a mid-point hit — it always walks to a width of zero. Same
/// asymptotic cost as [`BinarySearcher`]; the point (per §4.C5) is a
/// uniform instruction path for low-latency builds, not a different result.
#[derive(Default)]
pub struct BranchlessBinarySearcher;
impl Searcher for BranchlessBinarySearcher {
    fn lower_bound(entries: &[(OrderedFloat<f64>, Price)], target: OrderedFloat<f64>) -> usize {
        let mut lo = 0usize;
        let mut len = entries.len();
        while len > 0 {
            let half = len / 2;
            let mid = lo + half;
            let take_right = entries[mid].0 < target;
            lo = if take_right { mid + 1 } else { lo };
            len = if take_right { len - half - 1 } else { half };
        }
        lo
    }
}

/// Walks from the back (the best-price end) linearly. Appropriate when
/// matches cluster near top-of-book, since the common case then touches
/// only the first element or two (§4.C5).
#[derive(Default)]
pub struct LinearSearcher;
impl Searcher for LinearSearcher {
    fn lower_bound(entries: &[(OrderedFloat<f64>, Price)], target: OrderedFloat<f64>) -> usize {
        let mut idx = entries.len();
        while idx > 0 && entries[idx - 1].0 >= target {
            idx -= 1;
        }
        idx
    }
}

/// Sorted dynamic array shape (§4.C5 variant 2): kept sorted ascending by
/// [`LadderSide::rank`] so the best price always sits at the back.
/// Reserves `max_depth` capacity up front to avoid reallocation in the
/// common case (§6 configuration); growing past it is allowed, not
/// rejected (§8 "Max-depth bound").
pub struct ArrayLadder<S: LadderSide, Q: LevelQueue, P: Searcher> {
    entries: Vec<(OrderedFloat<f64>, Level<Q>)>,
    _side: PhantomData<S>,
    _searcher: PhantomData<P>,
}

impl<S: LadderSide, Q: LevelQueue, P: Searcher> ArrayLadder<S, Q, P> {
    pub fn with_capacity(max_depth: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_depth),
            _side: PhantomData,
            _searcher: PhantomData,
        }
    }

    fn ranks(&self) -> Vec<(OrderedFloat<f64>, Price)> {
        self.entries.iter().map(|(r, lvl)| (*r, lvl.price)).collect()
    }

    fn find_index(&self, price: Price) -> Result<usize, usize> {
        let target = S::rank(price);
        let ranks = self.ranks();
        let idx = P::lower_bound(&ranks, target);
        if idx < self.entries.len() && self.entries[idx].1.price == price {
            Ok(idx)
        } else {
            Err(idx)
        }
    }
}

impl<S: LadderSide, Q: LevelQueue, P: Searcher> Default for ArrayLadder<S, Q, P> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<S: LadderSide, Q: LevelQueue, P: Searcher> PriceLadder<S, Q> for ArrayLadder<S, Q, P> {
    fn with_capacity_hint(hint: usize) -> Self {
        Self::with_capacity(hint)
    }

    fn locate(&self, price: Price) -> Located {
        match self.find_index(price) {
            Ok(_) => Located::Found,
            Err(_) => Located::Absent,
        }
    }

    fn insert(&mut self, price: Price) {
        match self.find_index(price) {
            Ok(_) => {}
            Err(idx) => self.entries.insert(idx, (S::rank(price), Level::new(price))),
        }
    }

    fn remove(&mut self, price: Price) -> Option<Level<Q>> {
        match self.find_index(price) {
            Ok(idx) => Some(self.entries.remove(idx).1),
            Err(_) => None,
        }
    }

    fn get(&self, price: Price) -> Option<&Level<Q>> {
        self.find_index(price).ok().map(|idx| &self.entries[idx].1)
    }

    fn get_mut(&mut self, price: Price) -> Option<&mut Level<Q>> {
        match self.find_index(price) {
            Ok(idx) => Some(&mut self.entries[idx].1),
            Err(_) => None,
        }
    }

    fn best(&self) -> Option<&Level<Q>> {
        self.entries.last().map(|(_, lvl)| lvl)
    }

    fn worst(&self) -> Option<&Level<Q>> {
        self.entries.first().map(|(_, lvl)| lvl)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter_best_first(&self) -> Box<dyn Iterator<Item = &Level<Q>> + '_> {
        Box::new(self.entries.iter().rev().map(|(_, lvl)| lvl))
    }
}
