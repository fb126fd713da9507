/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Table augmentation: slack row and slack column.
//!
//! The `m × n` input becomes an `(m+1) × (n+1)` working table whose every
//! row sum and column sum is an integer:
//!
//! ```text
//! slack_row[j] = 1 − frac(colsum_j)            j < n   (appended first)
//! slack_col[i] = 1 − frac(rowsum_i)            i ≤ m   (over the m+1 rows)
//! ```
//!
//! An already-integral sum gets slack `1`, not `0`. That keeps the corner
//! and slack cells inside the balance argument like every other cell.
//!
//! # Invariants
//! - **Integral margins**: every row and column sum of [`AugmentedTable`]
//!   is an integer (up to floating error). Cycle adjustments preserve it.

use crate::table::{frac, Cell, Matrix, RoundedTable, Table};

/// Working `(m+1) × (n+1)` table: the input plus slack row and column.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedTable {
    cells: Matrix<f64>,
    rows: usize,
    cols: usize,
}

impl AugmentedTable {
    /// Rows of the original table (`m`).
    pub fn original_rows(&self) -> usize {
        self.rows
    }

    /// Columns of the original table (`n`).
    pub fn original_cols(&self) -> usize {
        self.cols
    }

    /// The full augmented matrix.
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.cells
    }

    /// Value of one augmented cell.
    #[inline]
    pub fn get(&self, (i, j): Cell) -> f64 {
        self.cells.get(i, j)
    }

    /// Add `delta` to one augmented cell.
    #[inline]
    pub(crate) fn add(&mut self, (i, j): Cell, delta: f64) {
        *self.cells.get_mut(i, j) += delta;
    }

    /// Row sums of the augmented table.
    pub fn row_sums(&self) -> Vec<f64> {
        self.cells.row_sums()
    }

    /// Column sums of the augmented table.
    pub fn col_sums(&self) -> Vec<f64> {
        self.cells.col_sums()
    }

    /// Round every cell to the nearest integer (half away from zero) and drop
    /// the slack row and column.
    pub fn into_rounded(self) -> RoundedTable {
        self.cells.sub_block(self.rows, self.cols).map(|v| v.round() as i64)
    }
}

/// Append the slack row, then the slack column.
///
/// Pure function of `table`; validation is the caller's job.
pub fn augment(table: &Table) -> AugmentedTable {
    let (m, n) = table.shape();
    let mut cells = Matrix::filled(m + 1, n + 1, 0.0);

    for ((i, j), v) in table.cells() {
        *cells.get_mut(i, j) = v;
    }
    for (j, s) in table.col_sums().into_iter().enumerate() {
        *cells.get_mut(m, j) = 1.0 - frac(s);
    }
    // Slack column covers the slack row too, so the corner closes both margins.
    for i in 0..=m {
        let s: f64 = cells.row(i)[..n].iter().sum();
        *cells.get_mut(i, n) = 1.0 - frac(s);
    }

    AugmentedTable { cells, rows: m, cols: n }
}
