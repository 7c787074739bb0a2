//! Search configuration
//!
//! Level 4 - Configuration

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use matchmaker_core::{MatchmakerError, MetricWeights, Result, DEFAULT_MAX_REJECTIONS};

/// Parameters of one search run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rounds per schedule
    pub num_rounds: usize,
    /// Simultaneous fields per round
    pub num_fields: usize,
    /// Full schedules sampled and scored
    pub num_iterations: usize,
    /// Loss weights
    pub weights: MetricWeights,
    /// Rejected draws allowed per round
    pub max_rejections: u32,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_rounds: 10,
            num_fields: 1,
            num_iterations: 1000,
            weights: MetricWeights::default(),
            max_rejections: DEFAULT_MAX_REJECTIONS,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn new(num_rounds: usize, num_fields: usize, num_iterations: usize) -> Self {
        Self {
            num_rounds,
            num_fields,
            num_iterations,
            ..Default::default()
        }
    }

    pub fn with_weights(mut self, weights: MetricWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// RNG from `seed`, or from entropy when unset
    pub fn create_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Reject zero rounds, fields, iterations or rejection cap
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.num_rounds, "num_rounds"),
            (self.num_fields, "num_fields"),
            (self.num_iterations, "num_iterations"),
            (self.max_rejections as usize, "max_rejections"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(MatchmakerError::InvalidConfig(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Independent runs on the rayon pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    pub runs: usize,
    /// Run `i` is seeded with `base_seed + i`
    pub base_seed: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            runs: rayon::current_num_threads(),
            base_seed: 0,
        }
    }
}

impl ParallelConfig {
    pub fn new(runs: usize, base_seed: u64) -> Self {
        Self { runs, base_seed }
    }

    /// Seed of run `index`
    pub fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}
