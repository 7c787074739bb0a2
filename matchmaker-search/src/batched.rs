//! Batched search driver
//!
//! Samples schedules in batches, scores each batch with the vectorized
//! engine and keeps the minimum. The winner is re-scored with the scalar
//! engine so the result carries full per-player statistics.

use rand::Rng;
use tracing::{debug, info};

use matchmaker_batch::{to_tensor, BatchScorer};
use matchmaker_core::{MatchmakerError, Result, Roster, RoundSampler, Schedule};
use matchmaker_stats::score_schedule;

use crate::config::SearchConfig;
use crate::optimizer::{warn_if_exhaustive, ImprovementTrace, SearchResult};

/// Batched search; trace iterations are global schedule indices
pub fn optimize_batched<R: Rng + ?Sized>(
    roster: &Roster,
    config: &SearchConfig,
    batch_size: usize,
    rng: &mut R,
) -> Result<SearchResult> {
    optimize_batched_with_callback(roster, config, batch_size, rng, |_, _| {})
}

/// Batched search, calling `callback(last_iteration, best_loss)` after every batch
pub fn optimize_batched_with_callback<R, F>(
    roster: &Roster,
    config: &SearchConfig,
    batch_size: usize,
    rng: &mut R,
    mut callback: F,
) -> Result<SearchResult>
where
    R: Rng + ?Sized,
    F: FnMut(usize, f64),
{
    config.validate()?;
    if batch_size == 0 {
        return Err(MatchmakerError::InvalidConfig(
            "batch_size must be positive".to_string(),
        ));
    }
    let sampler =
        RoundSampler::new(roster, config.num_fields)?.with_max_rejections(config.max_rejections);
    warn_if_exhaustive(roster, config);
    let scorer = BatchScorer::new(roster.len(), config.weights.clone());

    info!(
        "Starting batched search: players={}, rounds={}, fields={}, iterations={}, batch={}",
        roster.len(),
        config.num_rounds,
        config.num_fields,
        config.num_iterations,
        batch_size
    );

    let mut best: Option<(Schedule, f64)> = None;
    let mut trace = ImprovementTrace::default();
    let mut done = 0usize;

    while done < config.num_iterations {
        let size = batch_size.min(config.num_iterations - done);
        let schedules = (0..size)
            .map(|_| sampler.sample_schedule(config.num_rounds, rng))
            .collect::<Result<Vec<_>>>()?;
        let tensor = to_tensor(&schedules)?;
        let losses = scorer.losses(tensor.view())?;

        for (j, (schedule, loss)) in schedules.into_iter().zip(losses).enumerate() {
            let improved = best.as_ref().map_or(true, |(_, b)| loss < *b);
            if improved {
                debug!("Iteration {}: new best loss {:.6}", done + j, loss);
                trace.push(done + j, loss);
                best = Some((schedule, loss));
            }
        }

        done += size;
        if let Some((_, loss)) = &best {
            callback(done - 1, *loss);
        }
    }

    let (best_schedule, _) = best.ok_or_else(|| {
        MatchmakerError::InvalidConfig("search finished without any iteration".to_string())
    })?;
    let best_score = score_schedule(&best_schedule, roster.len(), &config.weights);
    info!(
        "Batched search finished: best loss {:.6} after {} improvement(s)",
        best_score.loss,
        trace.len()
    );

    Ok(SearchResult {
        best_loss: best_score.loss,
        best_schedule,
        best_score,
        trace,
        iterations: done,
    })
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
    fn test_batched_search_rescored_with_scalar_engine() {
        let roster = roster(9);
        let config = SearchConfig::new(6, 2, 95);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let result = optimize_batched(&roster, &config, 20, &mut rng).unwrap();

        assert_eq!(result.iterations, 95);
        assert!(result.best_schedule.validate().is_ok());
        let last = *result.trace.losses.last().unwrap();
        assert!((last - result.best_loss).abs() < 1e-6);
        assert!(result.trace.losses.windows(2).all(|w| w[1] < w[0]));
        assert!(result.trace.iterations.iter().all(|&i| i < 95));
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let roster = roster(7);
        let config = SearchConfig::new(5, 1, 30);
        let a = optimize_batched(&roster, &config, 7, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        let b = optimize_batched(&roster, &config, 30, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        assert_eq!(a.best_schedule, b.best_schedule);
        assert_eq!(a.trace.iterations, b.trace.iterations);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let roster = roster(6);
        let config = SearchConfig::new(2, 1, 5);
        assert!(matches!(
            optimize_batched(&roster, &config, 0, &mut ChaCha8Rng::seed_from_u64(0)),
            Err(MatchmakerError::InvalidConfig(_))
        ));
    }
}
