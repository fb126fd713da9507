/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Error taxonomy for controlled rounding.
//!
//! Three families, all surfaced to the caller of [`crate::round_table`]:
//!
//! - [`InvalidInput`]: rejected before augmentation.
//! - [`InvariantViolation`]: the balance invariant broke mid-run. Fatal; a
//!   retry on the same table would loop forever.
//! - [`RoundingError::NonConvergence`]: the iteration cap was hit.

use thiserror::Error;

/// Result type alias using [`RoundingError`].
pub type Result<T> = core::result::Result<T, RoundingError>;

/// Errors returned by the rounding engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoundingError {
    /// The table or configuration was rejected before any work was done.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The augmented table lost its integral-margin invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    /// The loop exceeded its iteration cap with fractional cells still present.
    #[error("failed to converge after {iterations} iterations ({fractional_cells} fractional cells remain)")]
    NonConvergence {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Fractional cells left in the augmented table.
        fractional_cells: usize,
    },
}

impl RoundingError {
    /// `true` for errors the caller can fix by changing the input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// `true` for the should-never-happen family.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Reasons a table or configuration is rejected up front.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    /// Zero rows or zero columns.
    #[error("table must be at least 1x1, got {rows}x{cols}")]
    EmptyTable {
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns supplied.
        cols: usize,
    },

    /// A row whose length differs from the first row.
    #[error("row {row} has {len} entries, expected {expected}")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Its length.
        len: usize,
        /// Length of row 0.
        expected: usize,
    },

    /// Flat data whose length is not `rows * cols`.
    #[error("{len} values cannot fill a {rows}x{cols} table")]
    ShapeMismatch {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
        /// Number of values supplied.
        len: usize,
    },

    /// An entry below zero.
    #[error("entry [{row}, {col}] = {value} is negative")]
    NegativeEntry {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The value.
        value: f64,
    },

    /// NaN or infinity.
    #[error("entry [{row}, {col}] = {value} is not finite")]
    NonFiniteEntry {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The value.
        value: f64,
    },

    /// An entry too large for every integer near it to be exact in `f64`.
    #[error("entry [{row}, {col}] = {value} exceeds the largest exact integer 2^53")]
    EntryTooLarge {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The value.
        value: f64,
    },

    /// Tolerance outside the open interval (0, 0.5).
    #[error("tolerance {0} must lie strictly between 0 and 0.5")]
    Tolerance(f64),

    /// A simulation asked for zero trials.
    #[error("trial count must be at least 1")]
    ZeroTrials,
}

/// Broken balance invariant detected during the cycle loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Fractional cells remain but their graph is acyclic.
    #[error("{fractional_cells} fractional cells remain but the fractional graph has no cycle")]
    NoCycle {
        /// Size of the fractional-cell set.
        fractional_cells: usize,
    },

    /// Both step sizes along a cycle are zero (or not finite).
    #[error("cycle of {cycle_len} cells admits no step in either direction")]
    ZeroStep {
        /// Number of cells on the cycle.
        cycle_len: usize,
    },
}
