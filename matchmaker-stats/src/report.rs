//! Serializable statistics snapshot
//!
//! Level 4 - Output types
//!
//! Histograms are rendered as ordered `[key, count]` lists with player names
//! and team labels as keys, so the snapshot is plain JSON data.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use matchmaker_core::{Roster, RESERVED_REPORT_KEY};

use crate::global::GlobalStatistics;
use crate::player_stats::PlayerStatistics;
use crate::score::ScheduleScore;

/// Statistics of one player with names in place of ids
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlayerReport {
    pub num_played_matches: u32,
    pub break_lengths: Vec<u32>,
    pub break_lengths_avg: f64,
    pub break_lengths_stdev: f64,
    pub break_lengths_hist: Vec<(u32, u32)>,
    pub session_lengths: Vec<u32>,
    pub second_session_length: f64,
    pub teammate_hist: Vec<(String, u32)>,
    pub teammate_hist_stdev: f64,
    pub opponent_hist: Vec<(String, u32)>,
    pub opponent_hist_stdev: f64,
    pub consecutive_teammates_hist: Vec<(String, u32)>,
    pub consecutive_teammates_total: u32,
    pub consecutive_opponents_hist: Vec<(String, u32)>,
    pub consecutive_opponents_total: u32,
    pub not_played_with_or_against: u32,
    pub not_played_with: u32,
    pub not_played_against: u32,
}

impl PlayerReport {
    pub fn new(stats: &PlayerStatistics, roster: &Roster) -> Self {
        let player_name = |id: u32| roster.name(id).map_or_else(|| format!("#{}", id), str::to_string);
        let named = |hist: &BTreeMap<u32, u32>| -> Vec<(String, u32)> {
            hist.iter().map(|(&k, &n)| (player_name(k), n)).collect()
        };

        Self {
            num_played_matches: stats.num_played_matches,
            break_lengths: stats.break_lengths.clone(),
            break_lengths_avg: stats.break_lengths_avg,
            break_lengths_stdev: stats.break_lengths_stdev,
            break_lengths_hist: stats.break_lengths_hist.iter().map(|(&k, &n)| (k, n)).collect(),
            session_lengths: stats.session_lengths.clone(),
            second_session_length: stats.second_session_length,
            teammate_hist: named(&stats.teammate_hist),
            teammate_hist_stdev: stats.teammate_hist_stdev,
            opponent_hist: stats
                .opponent_hist
                .iter()
                .map(|(t, &n)| (roster.team_label(t), n))
                .collect(),
            opponent_hist_stdev: stats.opponent_hist_stdev,
            consecutive_teammates_hist: named(&stats.consecutive_teammates_hist),
            consecutive_teammates_total: stats.consecutive_teammates_total,
            consecutive_opponents_hist: stats
                .consecutive_opponents_hist
                .iter()
                .map(|(t, &n)| (roster.team_label(t), n))
                .collect(),
            consecutive_opponents_total: stats.consecutive_opponents_total,
            not_played_with_or_against: stats.not_played_with_or_against,
            not_played_with: stats.not_played_with,
            not_played_against: stats.not_played_against,
        }
    }
}

/// `{ "global": {...}, "<player>": {...}, ... }`, players in roster order
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsReport {
    pub global: GlobalStatistics,
    pub players: Vec<(String, PlayerReport)>,
}

impl StatisticsReport {
    pub fn new(score: &ScheduleScore, roster: &Roster) -> Self {
        let players = score
            .players
            .iter()
            .map(|s| {
                let name = roster
                    .name(s.player)
                    .map_or_else(|| format!("#{}", s.player), str::to_string);
                (name, PlayerReport::new(s, roster))
            })
            .collect();
        Self {
            global: score.global,
            players,
        }
    }

    pub fn player(&self, name: &str) -> Option<&PlayerReport> {
        self.players.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

impl Serialize for StatisticsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.players.len() + 1))?;
        map.serialize_entry(RESERVED_REPORT_KEY, &self.global)?;
        for (name, report) in &self.players {
            map.serialize_entry(name, report)?;
        }
        map.end()
    }
}
