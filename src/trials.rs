/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Repeated-trial simulation: empirical bias of the rounder.
//!
//! Rounds the same table many times on one random stream and compares the
//! per-cell mean of the outputs with the input. For an unbiased rounder the
//! bias shrinks like `1 / sqrt(trials)`.

use tracing::debug;

use crate::error::{InvalidInput, Result};
use crate::rng::RandomSource;
use crate::rounder::{ControlledRounder, RoundingConfig};
use crate::table::{Matrix, Table};

/// Aggregate of many rounding trials.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialSummary {
    /// Number of trials run.
    pub trials: usize,
    /// Per-cell mean of the rounded tables.
    pub mean: Table,
    /// Per-cell `input − mean`.
    pub bias: Table,
    /// Total cycle adjustments across all trials.
    pub total_iterations: usize,
}

impl TrialSummary {
    /// Largest absolute per-cell bias.
    pub fn max_abs_bias(&self) -> f64 {
        self.bias.as_slice().iter().fold(0.0_f64, |acc, b| acc.max(b.abs()))
    }

    /// Mean cycle adjustments per trial.
    pub fn mean_iterations(&self) -> f64 {
        self.total_iterations as f64 / self.trials as f64
    }
}

/// Round `table` `trials` times and summarise.
///
/// Stops at the first failing trial and returns its error.
pub fn simulate<R: RandomSource + ?Sized>(
    table: &Table,
    config: &RoundingConfig,
    trials: usize,
    rng: &mut R,
) -> Result<TrialSummary> {
    if trials == 0 {
        return Err(InvalidInput::ZeroTrials.into());
    }
    let rounder = ControlledRounder::new(config.clone());
    let (m, n) = table.shape();
    let mut sum = vec![0.0_f64; m * n];
    let mut total_iterations = 0;

    for _ in 0..trials {
        let outcome = rounder.round(table, &mut *rng)?;
        for (acc, &v) in sum.iter_mut().zip(outcome.table.as_slice()) {
            *acc += v as f64;
        }
        total_iterations += outcome.stats.iterations;
    }

    let n_trials = trials as f64;
    let mean = Matrix::new(m, n, sum.into_iter().map(|s| s / n_trials).collect())?;
    let bias = Matrix::new(
        m,
        n,
        table.as_slice().iter().zip(mean.as_slice()).map(|(a, b)| a - b).collect(),
    )?;
    debug!(trials, total_iterations, "simulation finished");

    Ok(TrialSummary { trials, mean, bias, total_iterations })
}
