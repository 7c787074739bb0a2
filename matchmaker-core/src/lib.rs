//! Matchmaker Core - value types, sampler and metric catalogue
//!
//! This crate provides the structural layer of the schedule generator:
//! - Players, teams and matchups with canonical ordering
//! - Roster validation and canonical string labels
//! - Rounds and schedules with their structural invariants
//! - Rejection-sampling round sampler with a bounded retry cap
//! - Closed metric catalogue and loss weights
//! - Post-hoc schedule verification

pub mod error;
pub mod player;
pub mod roster;
pub mod schedule;
pub mod sampler;
pub mod metric;
pub mod verify;

// Re-exports for convenient access
pub use error::{MatchmakerError, Result};
pub use player::{Player, PlayerId, Team, Matchup};
pub use roster::{Roster, max_unique_matchups, RESERVED_REPORT_KEY};
pub use schedule::{Round, Schedule};
pub use sampler::{RoundSampler, MatchupHistory, DEFAULT_MAX_REJECTIONS};
pub use metric::{MetricKey, MetricWeights};
pub use verify::{verify_schedule, VerificationReport, DoubleBooking};
