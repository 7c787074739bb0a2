//! Round sampler
//!
//! Draws structurally valid rounds by rejection sampling:
//! 1. Pick `4 * num_fields` distinct players uniformly without replacement
//! 2. Partition the draw into groups of four, one matchup per field
//! 3. Reject the whole draw if any matchup is already in the history
//!
//! Accepted rounds are uniform over the feasible draws. The number of
//! rejected draws per round is capped, so an exhausted matchup space fails
//! with `ScheduleInfeasible` instead of looping forever.

use rand::seq::index;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::{MatchmakerError, Result};
use crate::player::{Matchup, PlayerId};
use crate::roster::Roster;
use crate::schedule::{Round, Schedule};

/// Rejected draws allowed per round before giving up
pub const DEFAULT_MAX_REJECTIONS: u32 = 10_000;

/// Matchups already used by the schedule under construction
#[derive(Clone, Debug, Default)]
pub struct MatchupHistory {
    seen: FxHashSet<Matchup>,
}

impl MatchupHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, matchup: &Matchup) -> bool {
        self.seen.contains(matchup)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Merge an accepted round
    pub fn record(&mut self, round: &Round) {
        self.seen.extend(round.matchups().iter().copied());
    }
}

/// Samples rounds and whole schedules for one roster and field count
#[derive(Clone, Debug)]
pub struct RoundSampler {
    pool: Vec<PlayerId>,
    num_fields: usize,
    max_rejections: u32,
}

impl RoundSampler {
    /// Fails with `InsufficientPlayers` before any sampling happens
    pub fn new(roster: &Roster, num_fields: usize) -> Result<Self> {
        roster.check_capacity(num_fields)?;
        Ok(Self {
            pool: roster.ids().collect(),
            num_fields,
            max_rejections: DEFAULT_MAX_REJECTIONS,
        })
    }

    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn num_players(&self) -> usize {
        self.pool.len()
    }

    pub fn max_rejections(&self) -> u32 {
        self.max_rejections
    }

    /// Sample one round that avoids every matchup in `history`
    ///
    /// The history is not updated; callers merge the accepted round.
    pub fn sample_round<R: Rng + ?Sized>(
        &self,
        history: &MatchupHistory,
        rng: &mut R,
    ) -> Result<Round> {
        self.try_sample(history, rng)?.ok_or_else(|| {
            let round = history.len() / self.num_fields;
            self.infeasible(round, round + 1, history.len())
        })
    }

    /// Sample `num_rounds` rounds sharing one history
    pub fn sample_schedule<R: Rng + ?Sized>(
        &self,
        num_rounds: usize,
        rng: &mut R,
    ) -> Result<Schedule> {
        let mut history = MatchupHistory::new();
        let mut schedule = Schedule::with_capacity(self.num_fields, num_rounds);

        for round_idx in 0..num_rounds {
            let round = self
                .try_sample(&history, rng)?
                .ok_or_else(|| self.infeasible(round_idx, num_rounds, history.len()))?;
            history.record(&round);
            schedule.push_round(round)?;
        }

        Ok(schedule)
    }

    /// `Ok(None)` once the rejection cap is exhausted
    fn try_sample<R: Rng + ?Sized>(
        &self,
        history: &MatchupHistory,
        rng: &mut R,
    ) -> Result<Option<Round>> {
        let amount = 4 * self.num_fields;
        let mut rejected = 0u32;

        loop {
            let draw = index::sample(rng, self.pool.len(), amount);
            let matchups = draw
                .into_vec()
                .chunks_exact(4)
                .map(|g| {
                    Matchup::from_players([
                        self.pool[g[0]],
                        self.pool[g[1]],
                        self.pool[g[2]],
                        self.pool[g[3]],
                    ])
                })
                .collect::<Result<Vec<_>>>()?;

            if !matchups.iter().any(|m| history.contains(m)) {
                return Round::new(matchups).map(Some);
            }

            rejected += 1;
            if rejected >= self.max_rejections {
                return Ok(None);
            }
        }
    }

    fn infeasible(&self, round: usize, num_rounds: usize, used_matchups: usize) -> MatchmakerError {
        MatchmakerError::ScheduleInfeasible {
            round,
            num_rounds,
            num_fields: self.num_fields,
            num_players: self.pool.len(),
            used_matchups,
            attempts: self.max_rejections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: usize) -> Roster {
        Roster::new((0..n).map(|i| format!("P{:02}", i))).unwrap()
    }

    #[test]
    fn test_sampled_schedule_is_valid() {
        let sampler = RoundSampler::new(&roster(11), 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let schedule = sampler.sample_schedule(12, &mut rng).unwrap();

        assert_eq!(schedule.num_rounds(), 12);
        assert_eq!(schedule.matchups().len(), 24);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_round_avoids_history() {
        let sampler = RoundSampler::new(&roster(4), 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut history = MatchupHistory::new();

        for _ in 0..3 {
            let round = sampler.sample_round(&history, &mut rng).unwrap();
            assert!(!history.contains(&round.matchups()[0]));
            history.record(&round);
        }
        assert_eq!(history.len(), 3);

        // Four players form exactly three matchups
        assert!(matches!(
            sampler.sample_round(&history, &mut rng),
            Err(MatchmakerError::ScheduleInfeasible { round: 3, .. })
        ));
    }

    #[test]
    fn test_exhausted_pool_fails_instead_of_hanging() {
        let sampler = RoundSampler::new(&roster(4), 1)
            .unwrap()
            .with_max_rejections(500);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        match sampler.sample_schedule(50, &mut rng) {
            Err(MatchmakerError::ScheduleInfeasible {
                round,
                num_rounds,
                num_players,
                used_matchups,
                attempts,
                ..
            }) => {
                assert_eq!(round, 3);
                assert_eq!(num_rounds, 50);
                assert_eq!(num_players, 4);
                assert_eq!(used_matchups, 3);
                assert_eq!(attempts, 500);
            }
            other => panic!("expected ScheduleInfeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_capacity_checked_up_front() {
        assert!(matches!(
            RoundSampler::new(&roster(6), 2),
            Err(MatchmakerError::InsufficientPlayers { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let sampler = RoundSampler::new(&roster(9), 2).unwrap();
        let a = sampler
            .sample_schedule(6, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();
        let b = sampler
            .sample_schedule(6, &mut ChaCha8Rng::seed_from_u64(99))
            .unwrap();
        assert_eq!(a, b);
    }
}
