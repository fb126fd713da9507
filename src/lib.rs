//! # ucr-core
//!
//! Unbiased controlled rounding of two-way tables.
//!
//! Reference: Cox, L. H. (1987). "A constructive procedure for unbiased
//! controlled rounding." *Journal of the American Statistical Association*
//! 82(398), 520–524.
//!
//! ---
//!
//! ## What it guarantees
//!
//! Given an `m × n` table of non-negative reals, [`round_table`] returns an
//! integer table such that:
//!
//! - **Controlled margins**: every row sum, column sum and the grand total
//!   of the output is the floor or ceiling of the matching input sum.
//! - **Unit deviation**: every cell moves to its own floor or ceiling.
//! - **Unbiased**: over the rounder's random choices, the expected output
//!   cell equals the input cell.
//!
//! Published statistical tables need all three at once: additive integer
//! margins, no cell visibly distorted, and no systematic drift that an
//! analyst could exploit or be misled by.
//!
//! ## The pipeline
//!
//! ```text
//! Table ─► augment ─► ┌─ fractional cells ─► FractionalGraph ─► Cycle ─► adjust ─┐ ─► round ─► RoundedTable
//!                     └───────────────────────── until none left ◄───────────────┘
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`table`] | [`Table`], [`RoundedTable`], [`Margins`] | Dense tables, margins, input validation |
//! | [`augment`] | [`AugmentedTable`] | Slack row + column so every margin is integral |
//! | [`graph`] | [`FractionalGraph`] | Bipartite row/column graph of unsettled cells |
//! | [`cycle`] | [`Cycle`] | Depth-first cycle search, direction ignored |
//! | [`adjust`] | [`StepSizes`], [`Direction`] | Random zero-mean step along a cycle |
//! | [`rounder`] | [`ControlledRounder`], [`RoundingConfig`] | The loop, iteration cap, statistics |
//! | [`rng`] | [`RandomSource`] | Injectable random stream (any `rand::Rng`) |
//! | [`trials`] | [`TrialSummary`] | Repeated trials and empirical bias |
//! | [`report`] | `RoundingReport` | Serialisable run record (requires `serde` feature) |
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use ucr_core::{round_table_with, RoundingConfig, Table};
//!
//! let table = Table::from_rows(&[[0.91, 0.7], [1.21, 2.0]]).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let rounded = round_table_with(&table, &RoundingConfig::default(), &mut rng).unwrap();
//! assert_eq!(rounded.shape(), (2, 2));
//! ```
//!
//! ## License
//!
//! Business Source License 1.1.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod table;
pub mod augment;
pub mod graph;
pub mod cycle;
pub mod adjust;
pub mod rng;
pub mod rounder;
pub mod trials;
#[cfg(feature = "serde")]
pub mod report;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use adjust::{Direction, StepSizes};
pub use augment::{augment, AugmentedTable};
pub use cycle::{find_cycle, Cycle};
pub use error::{InvalidInput, InvariantViolation, Result, RoundingError};
pub use graph::{fractional_cells, is_fractional, FractionalGraph};
pub use rng::RandomSource;
pub use rounder::{
    round_table, round_table_with, ControlledRounder, RoundingConfig, RoundingOutcome,
    RoundingStats, DEFAULT_TOLERANCE,
};
pub use table::{frac, Cell, Margins, Matrix, RoundedTable, Table, MAX_ENTRY};
pub use trials::{simulate, TrialSummary};
