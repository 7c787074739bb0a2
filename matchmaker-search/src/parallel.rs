//! Independent parallel runs
//!
//! Each run owns its RNG and search state; the only shared step is the
//! final min-by-loss reduction after every run has returned.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::info;

use matchmaker_core::{MatchmakerError, Result, Roster};

use crate::config::{ParallelConfig, SearchConfig};
use crate::optimizer::{optimize, SearchResult};

/// Best run of a parallel search
#[derive(Clone, Debug)]
pub struct ParallelSearchResult {
    pub best: SearchResult,
    /// Index of the winning run
    pub best_run: usize,
    /// Final loss of every run, in run order
    pub run_losses: Vec<f64>,
}

/// Run `runs` searches in parallel, run `i` seeded with `base_seed + i`
///
/// Ties go to the lowest run index; the first failing run (in run order)
/// fails the whole call.
pub fn optimize_parallel(
    roster: &Roster,
    config: &SearchConfig,
    runs: usize,
    base_seed: u64,
) -> Result<ParallelSearchResult> {
    if runs == 0 {
        return Err(MatchmakerError::InvalidConfig(
            "at least one run is required".to_string(),
        ));
    }
    let parallel = ParallelConfig::new(runs, base_seed);

    info!("Starting {} parallel runs from seed {}", runs, base_seed);
    let results: Vec<Result<SearchResult>> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(parallel.seed_for(i));
            optimize(roster, config, &mut rng)
        })
        .collect();

    reduce_min_loss(results)
}

/// Pick the lowest loss in run order; `results` must not be empty
fn reduce_min_loss(results: Vec<Result<SearchResult>>) -> Result<ParallelSearchResult> {
    let mut run_losses = Vec::with_capacity(results.len());
    let mut best: Option<(usize, SearchResult)> = None;

    for (i, result) in results.into_iter().enumerate() {
        let result = result?;
        run_losses.push(result.best_loss);
        let better = best
            .as_ref()
            .map_or(true, |(_, b)| result.best_loss < b.best_loss);
        if better {
            best = Some((i, result));
        }
    }

    let (best_run, best) = best.ok_or_else(|| {
        MatchmakerError::InvalidConfig("no run results to reduce".to_string())
    })?;
    info!("Run {} won with loss {:.6}", best_run, best.best_loss);

    Ok(ParallelSearchResult {
        best,
        best_run,
        run_losses,
    })
}
