//! # drip-decay — Periodic emission decay.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! A pool carrying a decay schedule loses `percent_bp` basis points of its
//! emission rate every `period_blocks` blocks:
//! - **Per-period flooring**: each period is applied as
//!   `rate * (10_000 - percent_bp) / 10_000` and truncated before the next,
//!   so `n` periods at once equal `n` single-period updates exactly.
//! - **Remainder-preserving timers**: the timer advances by whole periods,
//!   never to the current block.

pub mod engine;

pub use engine::{PeriodicDecay, retention_bp};
