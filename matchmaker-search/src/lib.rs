//! Matchmaker Search - Finding low-loss schedules
//!
//! This crate drives the sampler and the scorers:
//! - Random-restart search keeping the strictly best schedule
//! - Independent seeded runs on the rayon pool
//! - Batched search through the vectorized scorer
//!
//! # Architecture
//!
//! - Level 1: `optimize_seeded` / `optimize_parallel` / `optimize_batched` (entry points)
//! - Level 2: `Optimizer` (incremental search state)
//! - Level 3: sampling and scoring from the lower crates
//! - Level 4: `SearchConfig` / `ParallelConfig`

mod batched;
mod config;
mod optimizer;
mod parallel;

pub use batched::{optimize_batched, optimize_batched_with_callback};
pub use config::{ParallelConfig, SearchConfig};
pub use optimizer::{
    optimize, optimize_seeded, optimize_with_callback, ImprovementTrace, Optimizer, SearchResult,
    Step,
};
pub use parallel::{optimize_parallel, ParallelSearchResult};
