//! Batched session scoring
//!
//! Every session of a `(sessions, rounds, fields, SLOTS)` array is scored
//! independently, in parallel across the session axis. Reductions run in
//! ascending player id and ascending histogram key, through the same
//! numeric helpers as the scalar scorer, so both produce the same values.

use ndarray::{Array1, Array2, ArrayView3, ArrayView4, Axis};
use rayon::prelude::*;

use matchmaker_core::{MetricKey, MetricWeights, Result, Schedule};
use matchmaker_stats::numeric::{count_stdev, population_stdev};
use matchmaker_stats::{GlobalStatistics, SESSION_LENGTH_SENTINEL};

use crate::compact::{presence_mask, to_tensor, OPPONENT_SLOT, PARTNER_SLOT, SLOTS};
use crate::kernels::sessions_and_breaks;

/// Batch scoring options
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Sessions sampled and scored per batch by the batched search driver
    pub batch_size: usize,
    /// Score sessions on the rayon pool
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            parallel: true,
        }
    }
}

impl BatchConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Scores many equally-shaped schedules at once
#[derive(Clone, Debug)]
pub struct BatchScorer {
    num_players: usize,
    weights: MetricWeights,
    config: BatchConfig,
}

impl BatchScorer {
    pub fn new(num_players: usize, weights: MetricWeights) -> Self {
        Self {
            num_players,
            weights,
            config: BatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Global statistics per session
    pub fn global_statistics(&self, batch: ArrayView4<u32>) -> Result<Vec<GlobalStatistics>> {
        let sessions = batch.len_of(Axis(0));
        let score = |s: usize| score_session(batch.index_axis(Axis(0), s), self.num_players);
        if self.config.parallel {
            (0..sessions).into_par_iter().map(score).collect()
        } else {
            (0..sessions).map(score).collect()
        }
    }

    /// Weighted loss per session
    pub fn losses(&self, batch: ArrayView4<u32>) -> Result<Vec<f64>> {
        Ok(self
            .global_statistics(batch)?
            .iter()
            .map(|g| g.loss(&self.weights))
            .collect())
    }

    /// Pack and score a slice of schedules
    pub fn score_schedules(&self, schedules: &[Schedule]) -> Result<Vec<GlobalStatistics>> {
        let tensor = to_tensor(schedules)?;
        self.global_statistics(tensor.view())
    }
}

/// Per-round partner and opponent-team code of every player
///
/// Entries for rounds a player sits out are never read.
struct Encounters {
    partner: Array2<u32>,
    opponent_team: Array2<usize>,
}

fn encounters(session: ArrayView3<u32>, num_players: usize) -> Encounters {
    let num_rounds = session.len_of(Axis(0));
    let mut partner = Array2::<u32>::zeros((num_players, num_rounds));
    let mut opponent_team = Array2::<usize>::zeros((num_players, num_rounds));

    for (r, round) in session.axis_iter(Axis(0)).enumerate() {
        for field in round.axis_iter(Axis(0)) {
            for slot in 0..SLOTS {
                let p = field[slot] as usize;
                let o = OPPONENT_SLOT[slot];
                let (a, b) = (field[o] as usize, field[o + 1] as usize);
                partner[[p, r]] = field[PARTNER_SLOT[slot]];
                opponent_team[[p, r]] = a.min(b) * num_players + a.max(b);
            }
        }
    }
    Encounters {
        partner,
        opponent_team,
    }
}

/// Immediate repeats in a participation-order sequence
fn succession_total<T: PartialEq>(sequence: &[T]) -> u32 {
    sequence.windows(2).filter(|w| w[0] == w[1]).count() as u32
}

/// Stdev of the non-zero bins, ascending bin order
fn bin_stdev(bins: &Array1<u32>) -> f64 {
    count_stdev(bins.iter().copied().filter(|&c| c > 0))
}

fn score_session(session: ArrayView3<u32>, num_players: usize) -> Result<GlobalStatistics> {
    let mask = presence_mask(session, num_players)?;
    let played_counts = mask.map_axis(Axis(1), |row| row.iter().map(|&m| u32::from(m)).sum::<u32>());
    let (sessions, breaks) = sessions_and_breaks(mask.view());
    let enc = encounters(session, num_players);

    let others = num_players.saturating_sub(1);
    let mut played = Vec::new();
    let mut second_sessions = Vec::new();
    let mut engagement = Vec::new();
    let mut teammate_stdevs = Vec::new();
    let mut opponent_stdevs = Vec::new();
    let mut break_shortness = 0u64;
    let mut teammate_succession = 0u64;
    let mut opponent_succession = 0u64;
    let mut not_with_total = 0u64;
    let mut not_against_total = 0u64;
    let mut engagement_total = 0u64;

    let mut with = Array1::<u8>::zeros(num_players);
    let mut against = Array1::<u8>::zeros(num_players);
    let mut mate_bins = Array1::<u32>::zeros(num_players);
    let mut team_bins = Array1::<u32>::zeros(num_players * num_players);

    for p in 0..num_players {
        if played_counts[p] == 0 {
            continue;
        }

        let rounds: Vec<usize> = mask
            .row(p)
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m == 1)
            .map(|(r, _)| r)
            .collect();
        let mates: Vec<u32> = rounds.iter().map(|&r| enc.partner[[p, r]]).collect();
        let teams: Vec<usize> = rounds.iter().map(|&r| enc.opponent_team[[p, r]]).collect();

        with.fill(0);
        against.fill(0);
        mate_bins.fill(0);
        team_bins.fill(0);
        for &m in &mates {
            mate_bins[m as usize] += 1;
            with[m as usize] = 1;
        }
        for &t in &teams {
            team_bins[t] += 1;
            against[t / num_players] = 1;
            against[t % num_players] = 1;
        }

        let met = with.iter().zip(against.iter()).filter(|&(&w, &a)| (w | a) == 1).count();
        let with_count = with.iter().filter(|&&w| w == 1).count();
        let against_count = against.iter().filter(|&&a| a == 1).count();
        let not_either = others.saturating_sub(met) as u32;

        played.push(f64::from(played_counts[p]));
        second_sessions.push(
            sessions[p]
                .get(1)
                .map_or(SESSION_LENGTH_SENTINEL, |&s| f64::from(s)),
        );
        engagement.push(f64::from(not_either));
        teammate_stdevs.push(bin_stdev(&mate_bins));
        opponent_stdevs.push(bin_stdev(&team_bins));

        break_shortness += breaks[p]
            .iter()
            .filter(|&&b| b > 1)
            .map(|&b| u64::from(b) * u64::from(b))
            .sum::<u64>();
        teammate_succession += u64::from(succession_total(&mates));
        opponent_succession += u64::from(succession_total(&teams));
        engagement_total += u64::from(not_either);
        not_with_total += others.saturating_sub(with_count) as u64;
        not_against_total += others.saturating_sub(against_count) as u64;
    }

    let mut values = [0.0; MetricKey::COUNT];
    values[MetricKey::NotPlayingPlayers.index()] = num_players.saturating_sub(played.len()) as f64;
    values[MetricKey::PlayedMatches.index()] = population_stdev(&played);
    values[MetricKey::MatchupSessionLength.index()] = population_stdev(&second_sessions);
    values[MetricKey::BreakShortness.index()] = break_shortness as f64;
    values[MetricKey::TeammateVariety.index()] = teammate_stdevs.iter().sum();
    values[MetricKey::OpponentVariety.index()] = opponent_stdevs.iter().sum();
    values[MetricKey::TeammateSuccession.index()] = teammate_succession as f64;
    values[MetricKey::OpponentSuccession.index()] = opponent_succession as f64;
    values[MetricKey::Engagement.index()] = engagement_total as f64;
    values[MetricKey::EngagementFairness.index()] = population_stdev(&engagement);
    values[MetricKey::NotPlayedWith.index()] = not_with_total as f64;
    values[MetricKey::NotPlayedAgainst.index()] = not_against_total as f64;

    Ok(GlobalStatistics::from_values(values))
}
