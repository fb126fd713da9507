/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The rounding loop.
//!
//! ```text
//! augment ──► { fractional cells ─► shuffle ─► graph ─► cycle ─► adjust } ──► round ──► drop slack
//!                         ▲                                          │
//!                         └──────────────────────────────────────────┘
//! ```
//!
//! Every iteration settles at least one cell, and settled cells are never
//! revisited, so the loop ends after at most `(m+1)(n+1)` iterations on
//! well-conditioned input. The configurable cap guards against the rest.
//!
//! # Invariants
//! - Input is validated before augmentation; the input table is never mutated.
//! - One random stream per call; a seeded stream gives identical output.
//! - A missing cycle or a zero step aborts with [`InvariantViolation`]
//!   rather than retrying.

use tracing::{debug, trace, warn};

use crate::adjust::adjust_cycle;
use crate::augment::augment;
use crate::cycle::find_cycle;
use crate::error::{InvalidInput, InvariantViolation, Result, RoundingError};
use crate::graph::{fractional_cells, FractionalGraph};
use crate::rng::RandomSource;
use crate::table::{RoundedTable, Table};

/// Default tolerance: a cell within this distance of an integer is settled.
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Rounder configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundingConfig {
    /// Settling tolerance, strictly inside (0, 0.5). Default: 0.0001.
    pub tolerance: f64,
    /// Hard iteration cap. `None` derives `ceil((m+1)(n+1) / tolerance)`.
    pub max_iterations: Option<usize>,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE, max_iterations: None }
    }
}

impl RoundingConfig {
    /// Configuration with the given tolerance and the derived cap.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance, max_iterations: None }
    }

    /// Set an explicit iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Reject tolerances outside (0, 0.5).
    pub fn validate(&self) -> core::result::Result<(), InvalidInput> {
        if self.tolerance > 0.0 && self.tolerance < 0.5 {
            Ok(())
        } else {
            Err(InvalidInput::Tolerance(self.tolerance))
        }
    }

    /// Iteration cap for an `m × n` input.
    pub fn iteration_cap(&self, rows: usize, cols: usize) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            let cells = ((rows + 1) * (cols + 1)) as f64;
            (cells / self.tolerance).ceil() as usize
        })
    }
}

/// Counters from one rounding run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundingStats {
    /// Cycle adjustments performed.
    pub iterations: usize,
    /// Fractional cells in the freshly augmented table.
    pub initial_fractional_cells: usize,
    /// Length of the longest cycle adjusted.
    pub longest_cycle: usize,
    /// Total cells moved, summed over all cycles.
    pub cycle_cells_adjusted: usize,
}

/// Rounded table plus run statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundingOutcome {
    /// The `m × n` integer table.
    pub table: RoundedTable,
    /// What the loop did.
    pub stats: RoundingStats,
}

/// Unbiased controlled rounder.
#[derive(Clone, Debug, Default)]
pub struct ControlledRounder {
    config: RoundingConfig,
}

impl ControlledRounder {
    /// Rounder with `config`. The config is validated on every call.
    pub fn new(config: RoundingConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &RoundingConfig {
        &self.config
    }

    /// Round `table` drawing randomness from `rng`.
    pub fn round<R: RandomSource + ?Sized>(&self, table: &Table, rng: &mut R) -> Result<RoundingOutcome> {
        self.config.validate()?;
        table.validate()?;

        let tol = self.config.tolerance;
        let (m, n) = table.shape();
        let cap = self.config.iteration_cap(m, n);
        debug!(rows = m, cols = n, tolerance = tol, cap, "controlled rounding started");

        let mut work = augment(table);
        let mut stats = RoundingStats::default();

        loop {
            let mut cells = fractional_cells(&work, tol);
            if stats.iterations == 0 {
                stats.initial_fractional_cells = cells.len();
            }
            if cells.is_empty() {
                break;
            }
            if stats.iterations >= cap {
                warn!(iterations = stats.iterations, remaining = cells.len(), "rounding did not converge");
                return Err(RoundingError::NonConvergence {
                    iterations: stats.iterations,
                    fractional_cells: cells.len(),
                });
            }

            rng.permute(&mut cells);
            let graph = FractionalGraph::from_cells(m + 1, &cells);
            let Some(cycle) = find_cycle(&graph) else {
                warn!(fractional_cells = cells.len(), "fractional graph is acyclic");
                return Err(InvariantViolation::NoCycle { fractional_cells: cells.len() }.into());
            };

            let (direction, step) = adjust_cycle(&mut work, &cycle, &mut *rng).map_err(|e| {
                warn!(cycle_len = cycle.len(), "cycle admits no step");
                RoundingError::from(e)
            })?;
            trace!(
                iteration = stats.iterations,
                fractional = cells.len(),
                cycle_len = cycle.len(),
                ?direction,
                step,
                "cycle adjusted"
            );

            stats.iterations += 1;
            stats.longest_cycle = stats.longest_cycle.max(cycle.len());
            stats.cycle_cells_adjusted += cycle.len();
        }

        debug!(iterations = stats.iterations, "controlled rounding finished");
        Ok(RoundingOutcome { table: work.into_rounded(), stats })
    }
}

/// Round `table` with the given tolerance and the thread-local generator.
pub fn round_table(table: &Table, tolerance: f64) -> Result<RoundedTable> {
    round_table_with(table, &RoundingConfig::new(tolerance), &mut rand::rng())
}

/// Round `table` with an explicit configuration and random stream.
pub fn round_table_with<R: RandomSource + ?Sized>(
    table: &Table,
    config: &RoundingConfig,
    rng: &mut R,
) -> Result<RoundedTable> {
    ControlledRounder::new(config.clone()).round(table, rng).map(|o| o.table)
}
