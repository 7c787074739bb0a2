//! Matchmaker Stats - Schedule scoring
//!
//! This crate turns a candidate schedule into numbers:
//! - Per-player play/break patterns, partner and opponent histograms
//! - Global metrics reduced over all appearing players
//! - Weighted loss and a serializable statistics report
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: score_schedule (orchestration)
//! - Level 2: aggregate (phases)
//! - Level 3: calculate (per-player steps)
//! - Level 4: numeric helpers, report types

pub mod numeric;
mod player_stats;
mod global;
mod score;
mod report;

pub use player_stats::{calculate, PlayerStatistics, SESSION_LENGTH_SENTINEL};
pub use global::{aggregate, GlobalStatistics};
pub use score::{global_statistics, player_statistics, score_schedule, ScheduleScore};
pub use report::{PlayerReport, StatisticsReport};
