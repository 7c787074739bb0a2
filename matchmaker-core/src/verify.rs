//! Post-hoc schedule verification
//!
//! Checks an existing schedule (typically one read back from an export)
//! for repeated matchups, double-booked players and uneven playing time.
//! Unlike `Schedule::validate`, it collects every problem instead of
//! stopping at the first.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::player::{Matchup, PlayerId};
use crate::roster::Roster;
use crate::schedule::Schedule;

/// A player booked on more than one field of the same round
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DoubleBooking {
    pub round: usize,
    pub player: PlayerId,
    pub fields: usize,
}

/// Everything `verify_schedule` found
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationReport {
    pub total_matchups: usize,
    pub unique_matchups: usize,
    /// Matchups seen more than once, with their count
    pub duplicates: Vec<(Matchup, usize)>,
    pub double_bookings: Vec<DoubleBooking>,
    /// Games per roster player, zero for players never scheduled
    pub games_per_player: BTreeMap<PlayerId, usize>,
}

impl VerificationReport {
    /// No repeated matchups and no double bookings
    pub fn is_valid(&self) -> bool {
        self.duplicates.is_empty() && self.double_bookings.is_empty()
    }

    /// Every roster player has the same number of games
    pub fn is_fair(&self) -> bool {
        let mut counts = self.games_per_player.values();
        match counts.next() {
            Some(first) => counts.all(|c| c == first),
            None => true,
        }
    }

    pub fn min_games(&self) -> usize {
        self.games_per_player.values().copied().min().unwrap_or(0)
    }

    pub fn max_games(&self) -> usize {
        self.games_per_player.values().copied().max().unwrap_or(0)
    }
}

pub fn verify_schedule(schedule: &Schedule, roster: &Roster) -> VerificationReport {
    let mut matchup_counts: BTreeMap<Matchup, usize> = BTreeMap::new();
    for matchup in schedule.matchups() {
        *matchup_counts.entry(*matchup).or_insert(0) += 1;
    }

    let mut double_bookings = Vec::new();
    for (round_idx, round) in schedule.rounds().enumerate() {
        let mut fields: BTreeMap<PlayerId, usize> = BTreeMap::new();
        for player in round.iter().flat_map(|m| m.slots()) {
            *fields.entry(player).or_insert(0) += 1;
        }
        double_bookings.extend(
            fields
                .into_iter()
                .filter(|&(_, n)| n > 1)
                .map(|(player, fields)| DoubleBooking {
                    round: round_idx,
                    player,
                    fields,
                }),
        );
    }

    let mut games_per_player: BTreeMap<PlayerId, usize> = roster.ids().map(|id| (id, 0)).collect();
    for player in schedule.matchups().iter().flat_map(|m| m.slots()) {
        *games_per_player.entry(player).or_insert(0) += 1;
    }

    VerificationReport {
        total_matchups: schedule.matchups().len(),
        unique_matchups: matchup_counts.len(),
        duplicates: matchup_counts.into_iter().filter(|&(_, n)| n > 1).collect(),
        double_bookings,
        games_per_player,
    }
}
