//! Global metric aggregation
//!
//! Level 2 - Phases

use serde::ser::{Serialize, SerializeMap, Serializer};

use matchmaker_core::{MetricKey, MetricWeights};

use crate::numeric::population_stdev;
use crate::player_stats::PlayerStatistics;

/// One value per catalogue metric
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalStatistics {
    values: [f64; MetricKey::COUNT],
}

impl GlobalStatistics {
    pub fn from_values(values: [f64; MetricKey::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        self.values[key.index()]
    }

    pub fn values(&self) -> &[f64; MetricKey::COUNT] {
        &self.values
    }

    /// `(key, value)` in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// Weighted sum; lower is better
    pub fn loss(&self, weights: &MetricWeights) -> f64 {
        weights.weighted_sum(&self.values)
    }

    /// Largest per-metric difference to `other`
    pub fn max_abs_diff(&self, other: &GlobalStatistics) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Serialize for GlobalStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MetricKey::COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.name(), &value)?;
        }
        map.end()
    }
}

/// Reduce per-player statistics into the global metrics
///
/// `stats` holds one entry per player that appears in the schedule, in
/// ascending id order; the order fixes the floating-point summation order.
pub fn aggregate(stats: &[PlayerStatistics], num_players: usize) -> GlobalStatistics {
    let mut values = [0.0; MetricKey::COUNT];
    let mut set = |key: MetricKey, value: f64| values[key.index()] = value;

    let played: Vec<f64> = stats.iter().map(|s| f64::from(s.num_played_matches)).collect();
    let second_sessions: Vec<f64> = stats.iter().map(|s| s.second_session_length).collect();
    let engagement: Vec<f64> = stats
        .iter()
        .map(|s| f64::from(s.not_played_with_or_against))
        .collect();

    let break_shortness: u64 = stats
        .iter()
        .flat_map(|s| s.break_lengths.iter())
        .filter(|&&b| b > 1)
        .map(|&b| u64::from(b) * u64::from(b))
        .sum();

    let sum_u32 = |f: fn(&PlayerStatistics) -> u32| -> f64 {
        stats.iter().map(|s| u64::from(f(s))).sum::<u64>() as f64
    };
    let sum_f64 = |f: fn(&PlayerStatistics) -> f64| -> f64 { stats.iter().map(f).sum() };

    set(
        MetricKey::NotPlayingPlayers,
        num_players.saturating_sub(stats.len()) as f64,
    );
    set(MetricKey::PlayedMatches, population_stdev(&played));
    set(MetricKey::MatchupSessionLength, population_stdev(&second_sessions));
    set(MetricKey::BreakShortness, break_shortness as f64);
    set(MetricKey::TeammateVariety, sum_f64(|s| s.teammate_hist_stdev));
    set(MetricKey::OpponentVariety, sum_f64(|s| s.opponent_hist_stdev));
    set(
        MetricKey::TeammateSuccession,
        sum_u32(|s| s.consecutive_teammates_total),
    );
    set(
        MetricKey::OpponentSuccession,
        sum_u32(|s| s.consecutive_opponents_total),
    );
    set(MetricKey::Engagement, sum_u32(|s| s.not_played_with_or_against));
    set(MetricKey::EngagementFairness, population_stdev(&engagement));
    set(MetricKey::NotPlayedWith, sum_u32(|s| s.not_played_with));
    set(MetricKey::NotPlayedAgainst, sum_u32(|s| s.not_played_against));

    GlobalStatistics { values }
}
