//! Error taxonomy (§7, §10.1).
//!
//! Steady-state rejections (invalid input, duplicate id, an unmatchable
//! time-in-force, an unroutable market order) are *not* represented here —
//! per §7 they are silent no-ops surfaced only as an empty trade list or an
//! unchanged book, never as a `BookError`. This enum covers only the one
//! genuinely exceptional condition in the taxonomy (construction-time
//! resource exhaustion) plus configuration validation (§10.3).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("allocator exhausted: {0}")]
    AllocatorExhausted(String),
}
