//! Random-restart schedule search
//!
//! Every iteration samples a complete schedule (R rounds sharing one
//! matchup history), scores it, and keeps it if its loss is strictly lower
//! than the best so far. The improvement trace is therefore
//! non-increasing.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use matchmaker_core::{max_unique_matchups, MatchmakerError, Result, Roster, RoundSampler, Schedule};
use matchmaker_stats::{score_schedule, ScheduleScore};

use crate::config::SearchConfig;

/// Iterations at which the best loss improved, and the new losses
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImprovementTrace {
    pub iterations: Vec<usize>,
    pub losses: Vec<f64>,
}

impl ImprovementTrace {
    pub fn push(&mut self, iteration: usize, loss: f64) {
        self.iterations.push(iteration);
        self.losses.push(loss);
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }
}

/// Outcome of a finished search
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_schedule: Schedule,
    pub best_loss: f64,
    pub best_score: ScheduleScore,
    pub trace: ImprovementTrace,
    pub iterations: usize,
}

/// What one iteration did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Improved { iteration: usize, loss: f64 },
    NotImproved { iteration: usize, loss: f64 },
}

/// Incremental search state; drive with `step` or `run_with_callback`
pub struct Optimizer<'a> {
    roster: &'a Roster,
    config: SearchConfig,
    sampler: RoundSampler,
    iteration: usize,
    best: Option<(Schedule, ScheduleScore)>,
    trace: ImprovementTrace,
}

impl<'a> Optimizer<'a> {
    /// Check preconditions; no sampling happens here
    pub fn new(roster: &'a Roster, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let sampler = RoundSampler::new(roster, config.num_fields)?
            .with_max_rejections(config.max_rejections);
        warn_if_exhaustive(roster, &config);

        Ok(Self {
            roster,
            config,
            sampler,
            iteration: 0,
            best: None,
            trace: ImprovementTrace::default(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_done(&self) -> bool {
        self.iteration >= self.config.num_iterations
    }

    pub fn best_loss(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, score)| score.loss)
    }

    /// Sample and score one schedule
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step> {
        let iteration = self.iteration;
        let schedule = self.sampler.sample_schedule(self.config.num_rounds, rng)?;
        let score = score_schedule(&schedule, self.roster.len(), &self.config.weights);
        let loss = score.loss;
        self.iteration += 1;

        let improved = self.best_loss().map_or(true, |best| loss < best);
        if !improved {
            return Ok(Step::NotImproved { iteration, loss });
        }

        debug!("Iteration {}: new best loss {:.6}", iteration, loss);
        self.trace.push(iteration, loss);
        self.best = Some((schedule, score));
        Ok(Step::Improved { iteration, loss })
    }

    /// Run the remaining iterations, reporting `(iteration, best_loss)` after each
    pub fn run_with_callback<R, F>(mut self, rng: &mut R, mut callback: F) -> Result<SearchResult>
    where
        R: Rng + ?Sized,
        F: FnMut(usize, f64),
    {
        info!(
            "Starting search: players={}, rounds={}, fields={}, iterations={}",
            self.roster.len(),
            self.config.num_rounds,
            self.config.num_fields,
            self.config.num_iterations
        );

        while !self.is_done() {
            let step = self.step(rng)?;
            let iteration = match step {
                Step::Improved { iteration, .. } | Step::NotImproved { iteration, .. } => iteration,
            };
            if let Some(best) = self.best_loss() {
                callback(iteration, best);
            }
        }

        let result = self.finish()?;
        info!(
            "Search finished: best loss {:.6} after {} improvement(s)",
            result.best_loss,
            result.trace.len()
        );
        Ok(result)
    }

    /// Collect the best schedule found so far
    ///
    /// Requires at least one completed `step`; calling it on a fresh
    /// optimizer fails with `InvalidConfig`.
    pub fn finish(self) -> Result<SearchResult> {
        let (best_schedule, best_score) = self.best.ok_or_else(|| {
            MatchmakerError::InvalidConfig(
                "finish called before any iteration was stepped".to_string(),
            )
        })?;
        Ok(SearchResult {
            best_loss: best_score.loss,
            best_schedule,
            best_score,
            trace: self.trace,
            iterations: self.iteration,
        })
    }
}

/// Run a full search with an RNG built from `config.seed`
///
/// Without a seed the RNG is drawn from entropy.
pub fn optimize_seeded(roster: &Roster, config: &SearchConfig) -> Result<SearchResult> {
    optimize(roster, config, &mut config.create_rng())
}

/// Run a full search with the given RNG
pub fn optimize<R: Rng + ?Sized>(
    roster: &Roster,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<SearchResult> {
    optimize_with_callback(roster, config, rng, |_, _| {})
}

/// Run a full search, calling `callback(iteration, best_loss)` after every iteration
pub fn optimize_with_callback<R, F>(
    roster: &Roster,
    config: &SearchConfig,
    rng: &mut R,
    callback: F,
) -> Result<SearchResult>
where
    R: Rng + ?Sized,
    F: FnMut(usize, f64),
{
    Optimizer::new(roster, config.clone())?.run_with_callback(rng, callback)
}

/// Log when more matchups are requested than the pool can form
pub(crate) fn warn_if_exhaustive(roster: &Roster, config: &SearchConfig) {
    let requested = (config.num_rounds * config.num_fields) as u64;
    let available = max_unique_matchups(roster.len());
    if requested > available {
        warn!(
            "{} rounds x {} field(s) need {} distinct matchups, {} players only form {}; sampling will fail",
            config.num_rounds,
            config.num_fields,
            requested,
            roster.len(),
            available
        );
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
    fn test_trace_is_non_increasing() {
        let roster = roster(7);
        let config = SearchConfig::new(6, 1, 200);
        let result = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();

        assert!(!result.trace.is_empty());
        assert!(result.trace.losses.windows(2).all(|w| w[1] < w[0]));
        assert!(result.trace.iterations.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(result.trace.iterations[0], 0);
        assert_eq!(result.best_loss, *result.trace.losses.last().unwrap());
        assert_eq!(result.iterations, 200);
        assert!(result.best_schedule.validate().is_ok());
    }

    #[test]
    fn test_best_loss_matches_rescoring() {
        let roster = roster(9);
        let config = SearchConfig::new(5, 2, 50);
        let result = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let rescored = score_schedule(&result.best_schedule, roster.len(), &config.weights);
        assert_eq!(rescored.loss, result.best_loss);
    }

    #[test]
    fn test_callback_called_every_iteration() {
        let roster = roster(6);
        let config = SearchConfig::new(4, 1, 25);
        let mut calls = Vec::new();
        optimize_with_callback(
            &roster,
            &config,
            &mut ChaCha8Rng::seed_from_u64(1),
            |i, best| calls.push((i, best)),
        )
        .unwrap();

        assert_eq!(calls.len(), 25);
        assert_eq!(calls.last().unwrap().0, 24);
        assert!(calls.windows(2).all(|w| w[1].1 <= w[0].1));
    }

    #[test]
    fn test_step_by_step() {
        let roster = roster(6);
        let mut optimizer = Optimizer::new(&roster, SearchConfig::new(3, 1, 2)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        assert!(matches!(
            optimizer.step(&mut rng).unwrap(),
            Step::Improved { iteration: 0, .. }
        ));
        assert!(!optimizer.is_done());
        optimizer.step(&mut rng).unwrap();
        assert!(optimizer.is_done());
        assert_eq!(optimizer.finish().unwrap().iterations, 2);
    }

    #[test]
    fn test_finish_before_any_step() {
        let roster = roster(6);
        let optimizer = Optimizer::new(&roster, SearchConfig::new(3, 1, 2)).unwrap();
        assert!(matches!(
            optimizer.finish(),
            Err(MatchmakerError::InvalidConfig(msg)) if msg.contains("before any iteration")
        ));
    }

    #[test]
    fn test_seeded_search_uses_config_seed() {
        let roster = roster(7);
        let config = SearchConfig::new(5, 1, 40).with_seed(99);

        let seeded = optimize_seeded(&roster, &config).unwrap();
        let explicit = optimize(&roster, &config, &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        assert_eq!(seeded.best_schedule, explicit.best_schedule);
        assert_eq!(seeded.best_loss.to_bits(), explicit.best_loss.to_bits());
        assert_eq!(seeded.trace, optimize_seeded(&roster, &config).unwrap().trace);
    }

    #[test]
    fn test_preconditions_checked_before_sampling() {
        assert!(matches!(
            Optimizer::new(&roster(6), SearchConfig::new(10, 2, 100)),
            Err(MatchmakerError::InsufficientPlayers { .. })
        ));
        assert!(matches!(
            Optimizer::new(&roster(6), SearchConfig::new(0, 1, 100)),
            Err(MatchmakerError::InvalidConfig(_))
        ));
    }
}
