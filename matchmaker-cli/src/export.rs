//! JSON export format shared by `optimize` (writer) and `verify` (reader)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use matchmaker_core::{Matchup, MetricWeights, Roster, Schedule};
use matchmaker_search::ImprovementTrace;
use matchmaker_stats::StatisticsReport;

/// One field of one round, by player name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub round: usize,
    pub field: usize,
    pub team_a: [String; 2],
    pub team_b: [String; 2],
}

/// Inputs that produced an export
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportParameters {
    pub players: Vec<String>,
    pub num_rounds: usize,
    pub num_fields: usize,
    pub num_iterations: usize,
    pub runs: usize,
    pub batch_size: Option<usize>,
    pub seed: u64,
    pub weights: MetricWeights,
}

#[derive(Serialize)]
pub struct Export<'a> {
    pub generated_at: DateTime<Utc>,
    pub parameters: ExportParameters,
    pub loss: f64,
    pub schedule: Vec<ScheduleEntry>,
    pub statistics: StatisticsReport,
    pub trace: &'a ImprovementTrace,
}

/// The part of an export `verify` needs
#[derive(Deserialize)]
pub struct ImportedSchedule {
    pub parameters: ImportedParameters,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Deserialize)]
pub struct ImportedParameters {
    pub players: Vec<String>,
    pub num_fields: usize,
}

/// Flatten a schedule into named entries, round-major
pub fn schedule_entries(schedule: &Schedule, roster: &Roster) -> Vec<ScheduleEntry> {
    let names = |m: &Matchup| -> ([String; 2], [String; 2]) {
        let label = |id| roster.name(id).map_or_else(|| format!("#{}", id), str::to_string);
        let [a0, a1] = m.team_a().players();
        let [b0, b1] = m.team_b().players();
        ([label(a0), label(a1)], [label(b0), label(b1)])
    };

    schedule
        .rounds()
        .enumerate()
        .flat_map(|(round, matchups)| {
            matchups.iter().enumerate().map(move |(field, m)| (round, field, m))
        })
        .map(|(round, field, m)| {
            let (team_a, team_b) = names(m);
            ScheduleEntry {
                round,
                field,
                team_a,
                team_b,
            }
        })
        .collect()
}

impl ImportedSchedule {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn roster(&self) -> Result<Roster> {
        Roster::new(self.parameters.players.iter().cloned()).context("Invalid player list")
    }

    /// Rebuild the schedule; entries must be in round-major order
    pub fn to_schedule(&self, roster: &Roster) -> Result<Schedule> {
        let num_fields = self.parameters.num_fields;
        let mut matchups = Vec::with_capacity(self.schedule.len());

        for (i, entry) in self.schedule.iter().enumerate() {
            if num_fields == 0 || entry.round != i / num_fields || entry.field != i % num_fields {
                anyhow::bail!(
                    "Entry {} is round {} field {}, expected round {} field {}",
                    i,
                    entry.round,
                    entry.field,
                    i / num_fields.max(1),
                    i % num_fields.max(1)
                );
            }
            let [a0, a1] = &entry.team_a;
            let [b0, b1] = &entry.team_b;
            let matchup = roster
                .matchup_from_names([a0.as_str(), a1.as_str(), b0.as_str(), b1.as_str()])
                .with_context(|| format!("Invalid matchup in round {}", entry.round))?;
            matchups.push(matchup);
        }

        Ok(Schedule::from_matchups(num_fields, matchups)?)
    }
}
