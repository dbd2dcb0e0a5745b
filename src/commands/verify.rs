//! Randomized equivalence check against the dense oracle.
//!
//! Each trial draws a random workload from its own seed and applies every
//! operation both to a [`SkipListStore`] and to a [`DenseProfile`]. After
//! every step the two canonical segment lists must be identical and the
//! skip list store must be in canonical form.
//!
//! Trials are independent and run in parallel with Rayon.

use crate::commands::generate::GenerateConfig;
use crate::dense::DenseProfile;
use crate::error::{Result, SegmentsError};
use crate::segment::{check_canonical, format_segments, Position};
use crate::store::{SegmentStore, SkipListStore};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

/// Largest domain the dense oracle is built for.
pub const MAX_VERIFY_DOMAIN: Position = 1 << 28;

/// Verify command configuration.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Number of independent trials; trial `i` uses seed `workload.seed + i`
    pub trials: usize,
    /// Operations per trial and their distribution
    pub workload: GenerateConfig,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            trials: 16,
            workload: GenerateConfig {
                ops: 2000,
                domain: 1000,
                ..Default::default()
            },
        }
    }
}

/// Statistics from a verify run.
#[derive(Debug, Default, Clone)]
pub struct VerifyStats {
    pub trials: usize,
    pub ops: usize,
    pub max_breakpoints: usize,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for VerifyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trials: {}, Ops: {}, Max breakpoints: {} ({:.3}s)",
            self.trials, self.ops, self.max_breakpoints, self.elapsed_secs
        )
    }
}

/// Outcome of a single passing trial.
#[derive(Debug, Clone, Copy)]
struct TrialStats {
    ops: usize,
    max_breakpoints: usize,
}

/// Runs randomized trials comparing the skip list store with the oracle.
pub struct VerifyCommand {
    config: VerifyConfig,
}

impl VerifyCommand {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    /// Run all trials. Fails with [`SegmentsError::Mismatch`] on the first
    /// divergence found.
    pub fn run(&self) -> Result<VerifyStats> {
        let start = Instant::now();
        self.config.workload.validate()?;
        if self.config.workload.domain > MAX_VERIFY_DOMAIN {
            return Err(SegmentsError::InvalidArgument(format!(
                "domain {} exceeds the verify limit of {}",
                self.config.workload.domain, MAX_VERIFY_DOMAIN
            )));
        }

        let base_seed = self.config.workload.seed;
        let trials: Vec<TrialStats> = (0..self.config.trials)
            .into_par_iter()
            .map(|i| self.run_trial(base_seed.wrapping_add(i as u64)))
            .collect::<Result<_>>()?;

        Ok(VerifyStats {
            trials: trials.len(),
            ops: trials.iter().map(|t| t.ops).sum(),
            max_breakpoints: trials.iter().map(|t| t.max_breakpoints).max().unwrap_or(0),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn run_trial(&self, seed: u64) -> Result<TrialStats> {
        let workload = &self.config.workload;
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut store = SkipListStore::with_seed(seed);
        let mut oracle = DenseProfile::try_new(workload.domain as usize)?;
        let mut max_breakpoints = 0;

        for step in 0..workload.ops {
            let op = workload.random_op(&mut rng);
            op.apply(&mut oracle)?;
            op.apply(&mut store)?;

            let expected = oracle.segments();
            let actual = store.segments();
            if actual != expected || check_canonical(&actual).is_err() {
                return Err(SegmentsError::Mismatch {
                    seed,
                    step,
                    expected: format_segments(&expected),
                    actual: format_segments(&actual),
                });
            }
            max_breakpoints = max_breakpoints.max(store.len());
        }

        Ok(TrialStats {
            ops: workload.ops,
            max_breakpoints,
        })
    }
}
