//! Matchmaker Batch - Vectorized schedule scoring
//!
//! This crate scores thousands of candidate schedules per call:
//! - Dense `(sessions, rounds, fields, slots)` arrays via `ndarray`
//! - Presence masks and run detection by a difference kernel
//! - Session-parallel scoring on the rayon pool
//!
//! # Equivalence
//!
//! For any schedule the batched global statistics equal the scalar ones
//! from `matchmaker-stats`; `tests/equivalence.rs` checks this on random
//! schedules of varying shape.
//!
//! # Usage
//!
//! ```ignore
//! use matchmaker_batch::{to_tensor, BatchScorer};
//!
//! let scorer = BatchScorer::new(roster.len(), weights);
//! let tensor = to_tensor(&schedules)?;
//! let losses = scorer.losses(tensor.view())?;
//! ```

pub mod compact;
pub mod kernels;
mod scorer;

pub use compact::{presence_mask, session_schedule, to_tensor, SLOTS};
pub use kernels::{edges, EDGE_KERNEL};
pub use scorer::{BatchConfig, BatchScorer};
