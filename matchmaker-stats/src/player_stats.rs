//! Per-player statistics
//!
//! Level 3 - Steps

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_core::{PlayerId, Schedule, Team};

use crate::numeric::{count_stdev, histogram, mean, population_stdev, run_lengths, successions};

/// Second-session value used when a player has fewer than two sessions
pub const SESSION_LENGTH_SENTINEL: f64 = 10.0;

/// Play and break pattern, partners and opponents of one player
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStatistics {
    pub player: PlayerId,
    /// Rounds the player took part in
    pub num_played_matches: u32,
    /// Lengths of the runs of rounds sat out, in round order
    pub break_lengths: Vec<u32>,
    pub break_lengths_avg: f64,
    pub break_lengths_stdev: f64,
    pub break_lengths_hist: BTreeMap<u32, u32>,
    /// Lengths of the runs of rounds played between breaks, in round order
    pub session_lengths: Vec<u32>,
    /// Length of the second session, or the sentinel
    pub second_session_length: f64,
    pub teammate_hist: BTreeMap<PlayerId, u32>,
    pub teammate_hist_stdev: f64,
    pub opponent_hist: BTreeMap<Team, u32>,
    pub opponent_hist_stdev: f64,
    pub consecutive_teammates_hist: BTreeMap<PlayerId, u32>,
    pub consecutive_teammates_total: u32,
    pub consecutive_opponents_hist: BTreeMap<Team, u32>,
    pub consecutive_opponents_total: u32,
    pub not_played_with_or_against: u32,
    pub not_played_with: u32,
    pub not_played_against: u32,
}

/// Derive the statistics of `player` over `schedule`
///
/// `num_players` is the roster size; the never-met counts are taken
/// relative to the `num_players - 1` other players.
pub fn calculate(schedule: &Schedule, num_players: usize, player: PlayerId) -> PlayerStatistics {
    let mut played = Vec::with_capacity(schedule.num_rounds());
    let mut teammates = Vec::new();
    let mut opponents = Vec::new();

    for round in schedule.rounds() {
        let seat = round.iter().find(|m| m.contains(player));
        played.push(seat.is_some());
        if let Some(matchup) = seat {
            if let Some(mate) = matchup.teammate_of(player) {
                teammates.push(mate);
            }
            if let Some(team) = matchup.opponents_of(player) {
                opponents.push(team);
            }
        }
    }

    let break_lengths = run_lengths(&played, false);
    let session_lengths = run_lengths(&played, true);
    let break_values: Vec<f64> = break_lengths.iter().map(|&b| f64::from(b)).collect();

    let teammate_hist = histogram(&teammates);
    let opponent_hist = histogram(&opponents);
    let consecutive_teammates_hist = successions(&teammates);
    let consecutive_opponents_hist = successions(&opponents);

    let played_with: BTreeSet<PlayerId> = teammates.iter().copied().collect();
    let played_against: BTreeSet<PlayerId> =
        opponents.iter().flat_map(|t| t.players()).collect();
    let met = played_with.union(&played_against).count();
    let others = num_players.saturating_sub(1);

    PlayerStatistics {
        player,
        num_played_matches: played.iter().filter(|&&p| p).count() as u32,
        break_lengths_avg: mean(&break_values),
        break_lengths_stdev: population_stdev(&break_values),
        break_lengths_hist: histogram(&break_lengths),
        break_lengths,
        second_session_length: session_lengths
            .get(1)
            .map_or(SESSION_LENGTH_SENTINEL, |&s| f64::from(s)),
        session_lengths,
        teammate_hist_stdev: count_stdev(teammate_hist.values().copied()),
        teammate_hist,
        opponent_hist_stdev: count_stdev(opponent_hist.values().copied()),
        opponent_hist,
        consecutive_teammates_total: consecutive_teammates_hist.values().sum(),
        consecutive_teammates_hist,
        consecutive_opponents_total: consecutive_opponents_hist.values().sum(),
        consecutive_opponents_hist,
        not_played_with_or_against: others.saturating_sub(met) as u32,
        not_played_with: others.saturating_sub(played_with.len()) as u32,
        not_played_against: others.saturating_sub(played_against.len()) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchmaker_core::Matchup;

    fn schedule(num_fields: usize, rows: &[[PlayerId; 4]]) -> Schedule {
        let matchups = rows
            .iter()
            .map(|&p| Matchup::from_players(p).unwrap())
            .collect();
        Schedule::from_matchups(num_fields, matchups).unwrap()
    }

    #[test]
    fn test_breaks_and_sessions() {
        // Player 4 plays rounds 1, 3 and 4
        let s = schedule(
            1,
            &[
                [0, 1, 2, 3],
                [0, 4, 1, 2],
                [0, 1, 2, 3],
                [4, 1, 2, 3],
                [4, 0, 2, 3],
            ],
        );
        let stats = calculate(&s, 5, 4);
        assert_eq!(stats.num_played_matches, 3);
        assert_eq!(stats.break_lengths, vec![1, 1]);
        assert_eq!(stats.session_lengths, vec![1, 2]);
        assert_eq!(stats.second_session_length, 2.0);
        assert_eq!(stats.break_lengths_avg, 1.0);
        assert_eq!(stats.break_lengths_stdev, 0.0);
    }

    #[test]
    fn test_single_session_uses_sentinel() {
        let s = schedule(1, &[[0, 1, 2, 3], [0, 2, 1, 3]]);
        let stats = calculate(&s, 4, 0);
        assert_eq!(stats.session_lengths, vec![2]);
        assert_eq!(stats.second_session_length, SESSION_LENGTH_SENTINEL);
        assert!(stats.break_lengths.is_empty());
        assert_eq!(stats.break_lengths_stdev, 0.0);
    }

    #[test]
    fn test_successions_skip_breaks() {
        // Player 0 partners 1, sits out, partners 1 again
        let s = schedule(1, &[[0, 1, 2, 3], [2, 3, 4, 5], [0, 1, 4, 5]]);
        let stats = calculate(&s, 6, 0);
        assert_eq!(stats.consecutive_teammates_total, 1);
        assert_eq!(stats.consecutive_teammates_hist.get(&1), Some(&1));
        assert_eq!(stats.consecutive_opponents_total, 0);
        assert_eq!(stats.teammate_hist.get(&1), Some(&2));
        assert_eq!(stats.teammate_hist_stdev, 0.0);
    }

    #[test]
    fn test_never_met_counts() {
        let s = schedule(1, &[[0, 1, 2, 3], [0, 2, 1, 4]]);
        let stats = calculate(&s, 6, 0);
        // with {1, 2}, against {2, 3, 1, 4}, never 5
        assert_eq!(stats.not_played_with, 3);
        assert_eq!(stats.not_played_against, 1);
        assert_eq!(stats.not_played_with_or_against, 1);
        assert_eq!(stats.opponent_hist.len(), 2);
    }

    #[test]
    fn test_similar_names_do_not_leak_into_opponents() {
        // Ids are what matters; a player is never their own opponent
        let s = schedule(1, &[[10, 1, 0, 11], [0, 1, 10, 11]]);
        let stats = calculate(&s, 12, 1);
        assert!(stats.opponent_hist.keys().all(|t| !t.contains(1)));
        assert_eq!(stats.teammate_hist.get(&10), Some(&1));
        assert_eq!(stats.teammate_hist.get(&0), Some(&1));
    }
}
