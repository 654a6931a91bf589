//! Flyweight string pool (C9): shared interning of small repeating strings.
//!
//! The source keeps a process-wide interning table for short, high-repeat
//! strings attached to orders (client tags, venue codes). Per §5, that pool
//! is one of the only two blocking points in the system, guarded by a single
//! mutex. The rewrite follows the same shape but never installs it as a
//! hidden global: callers construct a `StringPool` explicitly and pass
//! `Arc<StringPool>` handles to whichever `OrderBook`s should share it
//! (§9 "Global pools").

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A single interned string. Cheap to clone and compare (pointer equality
/// would also work, but `PartialEq` falls back to string comparison so two
/// pools never produce surprising inequality).
#[derive(Debug, Clone, Eq)]
pub struct InternedString(Arc<str>);

impl InternedString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::fmt::Display for InternedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct PoolInner {
    table: HashMap<Arc<str>, ()>,
}

/// Shared string interning table. Construct one with [`StringPool::new`] and
/// share it (via `Arc`) across every `OrderBook` that should dedupe the same
/// set of strings; a book that doesn't share one gets its own private pool
/// implicitly (see [`crate::config::BookConfig`]).
pub struct StringPool {
    inner: Mutex<PoolInner>,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PoolInner::default()),
        }
    }

    /// Intern `value`, returning the shared handle. Reuses an existing
    /// allocation if `value` has been interned before.
    pub fn intern(&self, value: &str) -> InternedString {
        let mut inner = self.inner.lock();
        if let Some((existing, _)) = inner.table.get_key_value(value) {
            return InternedString(existing.clone());
        }
        let arc: Arc<str> = Arc::from(value);
        inner.table.insert(arc.clone(), ());
        InternedString(arc)
    }

    /// Number of distinct strings currently interned.
    pub fn size(&self) -> usize {
        self.inner.lock().table.len()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}
