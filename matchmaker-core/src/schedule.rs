//! Rounds and schedules

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::{MatchmakerError, Result};
use crate::player::{Matchup, PlayerId};

// ============================================================================
// ROUND
// ============================================================================

/// Simultaneous matchups, one per field; no player appears twice
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Round {
    matchups: Vec<Matchup>,
}

impl Round {
    /// Build a round; fails if a player is booked on two fields
    pub fn new(matchups: Vec<Matchup>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for player in matchups.iter().flat_map(|m| m.slots()) {
            if !seen.insert(player) {
                return Err(MatchmakerError::InvalidComposition(format!(
                    "player {} is booked on two fields of the same round",
                    player
                )));
            }
        }
        Ok(Self { matchups })
    }

    pub fn matchups(&self) -> &[Matchup] {
        &self.matchups
    }

    pub fn num_fields(&self) -> usize {
        self.matchups.len()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.matchups.iter().any(|m| m.contains(player))
    }

    pub fn into_matchups(self) -> Vec<Matchup> {
        self.matchups
    }
}

// ============================================================================
// SCHEDULE
// ============================================================================

/// Ordered rounds, stored flat in round-major, field-minor order
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Schedule {
    num_fields: usize,
    matchups: Vec<Matchup>,
}

impl Schedule {
    /// Empty schedule for `num_fields` fields
    pub fn new(num_fields: usize) -> Self {
        Self {
            num_fields,
            matchups: Vec::new(),
        }
    }

    pub fn with_capacity(num_fields: usize, num_rounds: usize) -> Self {
        Self {
            num_fields,
            matchups: Vec::with_capacity(num_fields * num_rounds),
        }
    }

    /// Wrap a flat matchup list; only the shape is checked
    ///
    /// Use [`Schedule::validate`] or `verify_schedule` to check the
    /// per-round and global invariants of imported data.
    pub fn from_matchups(num_fields: usize, matchups: Vec<Matchup>) -> Result<Self> {
        if num_fields == 0 {
            return Err(MatchmakerError::MalformedSchedule(
                "a schedule needs at least one field".to_string(),
            ));
        }
        if matchups.len() % num_fields != 0 {
            return Err(MatchmakerError::MalformedSchedule(format!(
                "{} matchups do not fill whole rounds of {} field(s)",
                matchups.len(),
                num_fields
            )));
        }
        Ok(Self {
            num_fields,
            matchups,
        })
    }

    /// Append a round; fails if its field count does not match
    pub fn push_round(&mut self, round: Round) -> Result<()> {
        if round.num_fields() != self.num_fields {
            return Err(MatchmakerError::MalformedSchedule(format!(
                "round has {} field(s), schedule expects {}",
                round.num_fields(),
                self.num_fields
            )));
        }
        self.matchups.extend(round.into_matchups());
        Ok(())
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn num_rounds(&self) -> usize {
        if self.num_fields == 0 {
            0
        } else {
            self.matchups.len() / self.num_fields
        }
    }

    /// All matchups, round-major
    pub fn matchups(&self) -> &[Matchup] {
        &self.matchups
    }

    /// Iterate rounds as slices of `num_fields` matchups
    pub fn rounds(&self) -> std::slice::Chunks<'_, Matchup> {
        self.matchups.chunks(self.num_fields.max(1))
    }

    pub fn round(&self, index: usize) -> Option<&[Matchup]> {
        let start = index * self.num_fields;
        self.matchups.get(start..start + self.num_fields)
    }

    /// Every player that appears at least once, ascending
    pub fn participants(&self) -> BTreeSet<PlayerId> {
        self.matchups.iter().flat_map(|m| m.slots()).collect()
    }

    /// Check that no round double-books a player and no matchup repeats
    pub fn validate(&self) -> Result<()> {
        for (round_idx, round) in self.rounds().enumerate() {
            let mut seen = FxHashSet::default();
            for player in round.iter().flat_map(|m| m.slots()) {
                if !seen.insert(player) {
                    return Err(MatchmakerError::MalformedSchedule(format!(
                        "player {} is booked twice in round {}",
                        player, round_idx
                    )));
                }
            }
        }

        let mut seen = FxHashSet::default();
        for (i, matchup) in self.matchups.iter().enumerate() {
            if !seen.insert(*matchup) {
                return Err(MatchmakerError::MalformedSchedule(format!(
                    "matchup {:?} repeats in round {}",
                    matchup.slots(),
                    i / self.num_fields
                )));
            }
        }
        Ok(())
    }
}
