//! Serialisable record of one rounding run, for persistence and audit trails.
//!
//! A published table is usually filed together with the margins it was
//! rounded against. [`RoundingReport`] carries both sides plus the loop
//! statistics and the configuration used, so the run can be checked later
//! without re-running it.
//!
//! # Layout
//!
//! ```text
//! version         u16          REPORT_VERSION
//! config          RoundingConfig
//! input           Matrix<f64>  the original m × n table
//! output          Matrix<i64>  the rounded m × n table
//! input_margins   Margins
//! output_margins  Margins
//! stats           RoundingStats
//! ```
//!
//! This module requires the `serde` feature.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use ucr_core::report::RoundingReport;
//! use ucr_core::{ControlledRounder, RoundingConfig, Table};
//!
//! let table = Table::from_rows(&[[0.91, 0.7], [1.21, 2.0]]).unwrap();
//! let rounder = ControlledRounder::new(RoundingConfig::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let outcome = rounder.round(&table, &mut rng).unwrap();
//!
//! let report = RoundingReport::new(&table, rounder.config(), &outcome);
//! let json = serde_json::to_string(&report).unwrap();
//! let back: RoundingReport = serde_json::from_str(&json).unwrap();
//! assert!(back.margins_consistent());
//! ```

use crate::rounder::{RoundingConfig, RoundingOutcome, RoundingStats};
use crate::table::{Margins, RoundedTable, Table};

/// Current report format version.
pub const REPORT_VERSION: u16 = 1;

/// One rounding run: input, output, margins, statistics.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct RoundingReport {
    /// Format version: always [`REPORT_VERSION`] for new reports.
    pub version: u16,
    /// Configuration the run used.
    pub config: RoundingConfig,
    /// The original table.
    pub input: Table,
    /// The rounded table.
    pub output: RoundedTable,
    /// Margins of `input`.
    pub input_margins: Margins,
    /// Margins of `output`.
    pub output_margins: Margins,
    /// Loop statistics.
    pub stats: RoundingStats,
}

impl RoundingReport {
    /// Build a report from a finished run.
    pub fn new(input: &Table, config: &RoundingConfig, outcome: &RoundingOutcome) -> Self {
        Self {
            version: REPORT_VERSION,
            config: config.clone(),
            input: input.clone(),
            output: outcome.table.clone(),
            input_margins: Margins::of(input),
            output_margins: Margins::of_rounded(&outcome.table),
            stats: outcome.stats.clone(),
        }
    }

    /// `true` when the stored output margins are a controlled rounding of
    /// the stored input margins.
    pub fn margins_consistent(&self) -> bool {
        self.output_margins.is_controlled_rounding_of(&self.input_margins, self.config.tolerance)
    }

    /// Largest `|output − input|` over all cells.
    pub fn max_deviation(&self) -> f64 {
        self.input
            .as_slice()
            .iter()
            .zip(self.output.as_slice())
            .fold(0.0_f64, |acc, (&a, &r)| acc.max((r as f64 - a).abs()))
    }
}
