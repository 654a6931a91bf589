//! Book configuration surface (§6, §10.3).
//!
//! `BookConfig` is serde-(de)serializable the way the workspace's own
//! `config` crate structures load from YAML, and carries a `validate()`
//! method in the same spirit as that crate's `validator` module — rejecting
//! nonsensical combinations up front rather than discovering them at
//! runtime.
//!
//! The concrete ladder/queue/searcher *types* are chosen at compile time
//! (Rust generics, not runtime dispatch — see the type aliases in
//! [`crate::engine`]); `BookConfig` exists so an embedding application can
//! describe, validate, and log which compile-time instantiation it's
//! running, and to carry the numeric knobs (`max_depth`, `slab_size`) that
//! really are runtime parameters.

use crate::error::BookError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderShape {
    Tree,
    SortedArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Searcher {
    Binary,
    BranchlessBinary,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelQueueShape {
    LinkedList,
    Deque,
    OrderedSet,
    Multiset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// Reserved capacity for the array-ladder variant. A hint, not a hard
    /// ceiling — see §8 "Max-depth bound".
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub ladder_shape: LadderShape,

    /// Only meaningful when `ladder_shape == SortedArray`; `validate()`
    /// rejects it being set alongside `Tree`.
    #[serde(default)]
    pub searcher: Option<Searcher>,

    #[serde(default)]
    pub level_queue_shape: LevelQueueShape,

    #[serde(default = "default_slab_size")]
    pub slab_size: usize,
}

fn default_max_depth() -> usize {
    65536
}

fn default_slab_size() -> usize {
    crate::allocator::DEFAULT_SLAB_SIZE
}

impl Default for LadderShape {
    fn default() -> Self {
        LadderShape::Tree
    }
}

impl Default for LevelQueueShape {
    fn default() -> Self {
        LevelQueueShape::LinkedList
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            ladder_shape: LadderShape::default(),
            searcher: None,
            level_queue_shape: LevelQueueShape::default(),
            slab_size: default_slab_size(),
        }
    }
}

impl BookConfig {
    pub fn validate(&self) -> Result<(), BookError> {
        if self.slab_size == 0 {
            return Err(BookError::Config("slab_size must be > 0".into()));
        }
        if self.max_depth == 0 {
            return Err(BookError::Config("max_depth must be > 0".into()));
        }
        match (self.ladder_shape, self.searcher) {
            (LadderShape::Tree, Some(_)) => Err(BookError::Config(
                "searcher is only meaningful when ladder_shape = sorted_array".into(),
            )),
            (LadderShape::SortedArray, None) => Err(BookError::Config(
                "sorted_array ladder requires a searcher to be selected".into(),
            )),
            _ => Ok(()),
        }
    }
}
