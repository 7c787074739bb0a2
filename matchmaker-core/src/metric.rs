//! Metric catalogue and loss weights
//!
//! The catalogue is closed: every global metric is a `MetricKey` variant and
//! weights live in a fixed table indexed by the key. Weight files name keys
//! as strings, so unknown names are rejected when the file is loaded.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MatchmakerError, Result};

/// One global metric of a scored schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKey {
    NotPlayingPlayers,
    PlayedMatches,
    MatchupSessionLength,
    BreakShortness,
    TeammateVariety,
    OpponentVariety,
    TeammateSuccession,
    OpponentSuccession,
    Engagement,
    EngagementFairness,
    NotPlayedWith,
    NotPlayedAgainst,
}

impl MetricKey {
    pub const COUNT: usize = 12;

    /// Catalogue order
    pub const ALL: [MetricKey; Self::COUNT] = [
        MetricKey::NotPlayingPlayers,
        MetricKey::PlayedMatches,
        MetricKey::MatchupSessionLength,
        MetricKey::BreakShortness,
        MetricKey::TeammateVariety,
        MetricKey::OpponentVariety,
        MetricKey::TeammateSuccession,
        MetricKey::OpponentSuccession,
        MetricKey::Engagement,
        MetricKey::EngagementFairness,
        MetricKey::NotPlayedWith,
        MetricKey::NotPlayedAgainst,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricKey::NotPlayingPlayers => "not-playing-players",
            MetricKey::PlayedMatches => "played-matches",
            MetricKey::MatchupSessionLength => "matchup-session-length",
            MetricKey::BreakShortness => "break-shortness",
            MetricKey::TeammateVariety => "teammate-variety",
            MetricKey::OpponentVariety => "opponent-variety",
            MetricKey::TeammateSuccession => "teammate-succession",
            MetricKey::OpponentSuccession => "opponent-succession",
            MetricKey::Engagement => "engagement",
            MetricKey::EngagementFairness => "engagement-fairness",
            MetricKey::NotPlayedWith => "not-played-with",
            MetricKey::NotPlayedAgainst => "not-played-against",
        }
    }

    /// Names used by older weight files
    pub fn legacy_names(self) -> &'static [&'static str] {
        match self {
            MetricKey::NotPlayingPlayers => &["global_not_playing_players_index"],
            MetricKey::PlayedMatches => &["global_played_matches_index"],
            MetricKey::MatchupSessionLength => &[
                "global_matchup_session_length_between_breaks_index",
                "global_matchup_length_index",
            ],
            MetricKey::BreakShortness => &["global_break_shortness_index"],
            MetricKey::TeammateVariety => &["global_teammate_variety_index"],
            MetricKey::OpponentVariety => &["global_enemy_team_variety_index"],
            MetricKey::TeammateSuccession => &["global_teammate_succession_index"],
            MetricKey::OpponentSuccession => &["global_enemy_team_succession_index"],
            MetricKey::Engagement => &[
                "global_not_played_with_or_against_players_index",
                "global_player_engagement_index",
            ],
            MetricKey::EngagementFairness => &["global_player_engagement_fairness_index"],
            MetricKey::NotPlayedWith => &["global_not_played_with_players_index"],
            MetricKey::NotPlayedAgainst => &["global_not_played_against_players_index"],
        }
    }

    /// Resolve a canonical or legacy name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == name || k.legacy_names().contains(&name))
            .ok_or_else(|| MatchmakerError::UnknownMetric(name.to_string()))
    }
}

impl FromStr for MetricKey {
    type Err = MatchmakerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// WEIGHTS
// ============================================================================

/// Loss weight per metric; metrics left out of a config weigh 0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct MetricWeights {
    weights: [f64; MetricKey::COUNT],
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self::zero()
            .with(MetricKey::NotPlayingPlayers, 1e8)
            .with(MetricKey::PlayedMatches, 1e5)
            .with(MetricKey::Engagement, 1e4)
            .with(MetricKey::MatchupSessionLength, 100.0)
            .with(MetricKey::EngagementFairness, 10.0)
            .with(MetricKey::TeammateSuccession, 100.0)
            .with(MetricKey::OpponentSuccession, 10.0)
            .with(MetricKey::TeammateVariety, 100.0)
            .with(MetricKey::OpponentVariety, 10.0)
            .with(MetricKey::BreakShortness, 10.0)
            .with(MetricKey::NotPlayedWith, 100.0)
            .with(MetricKey::NotPlayedAgainst, 10.0)
    }
}

impl MetricWeights {
    /// Every metric excluded
    pub fn zero() -> Self {
        Self {
            weights: [0.0; MetricKey::COUNT],
        }
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        self.weights[key.index()]
    }

    pub fn set(&mut self, key: MetricKey, weight: f64) {
        self.weights[key.index()] = weight;
    }

    pub fn with(mut self, key: MetricKey, weight: f64) -> Self {
        self.set(key, weight);
        self
    }

    /// `(key, weight)` in catalogue order
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// Sum of `weight * value` in catalogue order
    pub fn weighted_sum(&self, values: &[f64; MetricKey::COUNT]) -> f64 {
        self.weights
            .iter()
            .zip(values.iter())
            .map(|(w, v)| w * v)
            .sum()
    }

    /// Parse a JSON object mapping metric names to weights
    pub fn from_json(text: &str) -> Result<Self> {
        let map: BTreeMap<String, f64> = serde_json::from_str(text)
            .map_err(|e| MatchmakerError::InvalidConfig(format!("weights: {}", e)))?;
        Self::try_from(map)
    }
}

impl TryFrom<BTreeMap<String, f64>> for MetricWeights {
    type Error = MatchmakerError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self> {
        let mut weights = Self::zero();
        for (name, weight) in map {
            if !weight.is_finite() {
                return Err(MatchmakerError::InvalidConfig(format!(
                    "weight for '{}' must be finite, got {}",
                    name, weight
                )));
            }
            weights.set(MetricKey::from_name(&name)?, weight);
        }
        Ok(weights)
    }
}

impl From<MetricWeights> for BTreeMap<String, f64> {
    fn from(weights: MetricWeights) -> Self {
        weights
            .iter()
            .map(|(k, w)| (k.name().to_string(), w))
            .collect()
    }
}
