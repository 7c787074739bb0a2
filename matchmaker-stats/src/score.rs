//! Whole-schedule scoring
//!
//! Level 1 - Orchestration

use matchmaker_core::{MetricWeights, Schedule};

use crate::global::{aggregate, GlobalStatistics};
use crate::player_stats::{calculate, PlayerStatistics};

/// Statistics and loss of one candidate schedule
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleScore {
    /// One entry per appearing player, ascending id
    pub players: Vec<PlayerStatistics>,
    pub global: GlobalStatistics,
    pub loss: f64,
}

/// Per-player statistics for every player that appears, ascending id
pub fn player_statistics(schedule: &Schedule, num_players: usize) -> Vec<PlayerStatistics> {
    schedule
        .participants()
        .into_iter()
        .map(|p| calculate(schedule, num_players, p))
        .collect()
}

/// Global statistics only
pub fn global_statistics(schedule: &Schedule, num_players: usize) -> GlobalStatistics {
    aggregate(&player_statistics(schedule, num_players), num_players)
}

/// Score a schedule against a roster of `num_players`
pub fn score_schedule(
    schedule: &Schedule,
    num_players: usize,
    weights: &MetricWeights,
) -> ScheduleScore {
    let players = player_statistics(schedule, num_players);
    let global = aggregate(&players, num_players);
    let loss = global.loss(weights);
    ScheduleScore {
        players,
        global,
        loss,
    }
}
