/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Dense two-way tables and their margins.
//!
//! [`Matrix`] is a row-major `rows × cols` grid. The rounding engine reads a
//! [`Table`] (real, non-negative) and produces a [`RoundedTable`] (integer).
//!
//! # Invariants
//! - **Shape**: `data.len() == rows * cols`, `rows ≥ 1`, `cols ≥ 1`.
//! - The input table is never mutated; the engine works on an augmented copy.

use crate::error::InvalidInput;

/// Coordinate of one cell: `(row, col)`.
pub type Cell = (usize, usize);

/// Largest accepted entry, `2^53`. Above it `f64` cannot hold every
/// integer, so floor and ceiling stop being neighbours.
pub const MAX_ENTRY: f64 = 9_007_199_254_740_992.0;

/// Fractional part `x - floor(x)`, in `[0, 1)`.
#[inline]
pub fn frac(x: f64) -> f64 {
    x - x.floor()
}

/// Row-major dense matrix.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawMatrix<T>")
)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Wire form of [`Matrix`], shape unchecked.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawMatrix<T>> for Matrix<T> {
    type Error = InvalidInput;

    fn try_from(raw: RawMatrix<T>) -> Result<Self, InvalidInput> {
        check_shape(raw.rows, raw.cols, raw.data.len())?;
        Ok(Self { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

fn check_shape(rows: usize, cols: usize, len: usize) -> Result<(), InvalidInput> {
    if rows == 0 || cols == 0 {
        return Err(InvalidInput::EmptyTable { rows, cols });
    }
    if rows.checked_mul(cols) != Some(len) {
        return Err(InvalidInput::ShapeMismatch { rows, cols, len });
    }
    Ok(())
}

/// Real-valued input table.
pub type Table = Matrix<f64>;

/// Integer-valued output of controlled rounding.
pub type RoundedTable = Matrix<i64>;

impl<T: Copy> Matrix<T> {
    /// Build from row-major flat data.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, InvalidInput> {
        check_shape(rows, cols, data.len())?;
        Ok(Self { rows, cols, data })
    }

    /// Build from a list of rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, InvalidInput> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.is_empty() || cols == 0 {
            return Err(InvalidInput::EmptyTable { rows: rows.len(), cols });
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(InvalidInput::RaggedRow { row: i, len: row.len(), expected: cols });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    /// A `rows × cols` matrix filled with `value`. Dimensions are not checked.
    pub(crate) fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self { rows, cols, data: vec![value; rows * cols] }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Entry at `(row, col)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Mutable entry at `(row, col)`.
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[row * self.cols + col]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks(self.cols)
    }

    /// Iterate `((row, col), value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, T)> + '_ {
        let cols = self.cols;
        self.data.iter().enumerate().map(move |(k, &v)| ((k / cols, k % cols), v))
    }

    /// Row-major flat data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Copy out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }

    /// Top-left `rows × cols` sub-block.
    pub(crate) fn sub_block(&self, rows: usize, cols: usize) -> Self {
        let data = self.iter_rows().take(rows).flat_map(|r| r[..cols].iter().copied()).collect();
        Self { rows, cols, data }
    }

    /// Element-wise map into a new matrix of the same shape.
    pub fn map<U, F: FnMut(T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix { rows: self.rows, cols: self.cols, data: self.data.iter().copied().map(f).collect() }
    }
}

impl Table {
    /// Reject negative, non-finite, or over-large entries.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        for ((row, col), value) in self.cells() {
            if !value.is_finite() {
                return Err(InvalidInput::NonFiniteEntry { row, col, value });
            }
            if value < 0.0 {
                return Err(InvalidInput::NegativeEntry { row, col, value });
            }
            if value > MAX_ENTRY {
                return Err(InvalidInput::EntryTooLarge { row, col, value });
            }
        }
        Ok(())
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        self.iter_rows().map(|r| r.iter().sum()).collect()
    }

    /// Sum of each column.
    pub fn col_sums(&self) -> Vec<f64> {
        (0..self.cols).map(|j| (0..self.rows).map(|i| self.get(i, j)).sum()).collect()
    }
}

/// Row, column and grand totals of a table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    /// Row sums.
    pub rows: Vec<f64>,
    /// Column sums.
    pub cols: Vec<f64>,
    /// Grand total.
    pub total: f64,
}

impl Margins {
    /// Margins of a real table.
    pub fn of(table: &Table) -> Self {
        let rows = table.row_sums();
        let cols = table.col_sums();
        let total = rows.iter().sum();
        Self { rows, cols, total }
    }

    /// Margins of a rounded table, as reals.
    pub fn of_rounded(table: &RoundedTable) -> Self {
        Self::of(&table.map(|v| v as f64))
    }

    /// `true` when every margin of `self` is the floor or ceiling of the
    /// matching margin of `original`.
    ///
    /// `tol` absorbs floating error in the original sums: a margin within
    /// `tol` of an integer must be matched exactly by that integer.
    pub fn is_controlled_rounding_of(&self, original: &Margins, tol: f64) -> bool {
        if self.rows.len() != original.rows.len() || self.cols.len() != original.cols.len() {
            return false;
        }
        let ok = |rounded: f64, real: f64| {
            let nearest = real.round();
            if (real - nearest).abs() <= tol {
                rounded == nearest
            } else {
                rounded == real.floor() || rounded == real.ceil()
            }
        };
        self.rows.iter().zip(&original.rows).all(|(&r, &o)| ok(r, o))
            && self.cols.iter().zip(&original.cols).all(|(&r, &o)| ok(r, o))
            && ok(self.total, original.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Table {
        Table::from_rows(&[
            [0.91, 0.7, 1.23, 0.1],
            [1.21, 2.0, 2.83, 0.2],
            [1.21, 0.2, 1.03, 0.5],
        ])
        .unwrap()
    }

    #[test]
    fn test_frac_is_in_unit_interval() {
        assert!((frac(2.75) - 0.75).abs() < 1e-12);
        assert_eq!(frac(3.0), 0.0);
        assert!((frac(-0.25) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Table::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err, InvalidInput::RaggedRow { row: 1, len: 1, expected: 2 });
    }

    #[test]
    fn test_empty_is_rejected() {
        let rows: [[f64; 0]; 0] = [];
        assert!(matches!(Table::from_rows(&rows), Err(InvalidInput::EmptyTable { .. })));
        assert!(matches!(Table::new(2, 0, vec![]), Err(InvalidInput::EmptyTable { .. })));
        assert!(matches!(Table::new(2, 2, vec![1.0]), Err(InvalidInput::ShapeMismatch { .. })));
    }

    #[test]
    fn test_validate_flags_first_bad_entry() {
        let t = Table::from_rows(&[[1.0, f64::NAN], [-1.0, 0.0]]).unwrap();
        assert!(matches!(t.validate(), Err(InvalidInput::NonFiniteEntry { row: 0, col: 1, .. })));
        let t = Table::from_rows(&[[1.0, 2.0], [-1.0, 0.0]]).unwrap();
        assert!(matches!(t.validate(), Err(InvalidInput::NegativeEntry { row: 1, col: 0, .. })));
    }

    #[test]
    fn test_validate_caps_magnitude() {
        let t = Table::from_rows(&[[0.5, MAX_ENTRY]]).unwrap();
        assert_eq!(t.validate(), Ok(()));
        let t = Table::from_rows(&[[0.5, 1e19]]).unwrap();
        assert!(matches!(t.validate(), Err(InvalidInput::EntryTooLarge { row: 0, col: 1, .. })));
    }

    #[test]
    fn test_margins_of_example() {
        let m = Margins::of(&example());
        let expect_rows = [2.94, 6.24, 2.94];
        let expect_cols = [3.33, 2.9, 5.09, 0.8];
        for (a, b) in m.rows.iter().zip(expect_rows) {
            assert!((a - b).abs() < 1e-9, "row sum {} vs {}", a, b);
        }
        for (a, b) in m.cols.iter().zip(expect_cols) {
            assert!((a - b).abs() < 1e-9, "col sum {} vs {}", a, b);
        }
        assert!((m.total - 12.12).abs() < 1e-9);
    }

    #[test]
    fn test_controlled_rounding_check() {
        let original = Margins { rows: vec![2.94, 4.0], cols: vec![3.5, 3.44], total: 6.94 };
        let good = Margins { rows: vec![2.0, 4.0], cols: vec![4.0, 3.0], total: 7.0 };
        assert!(good.is_controlled_rounding_of(&original, 1e-9));
        // Integral margin 4.0 must stay 4.
        let bad = Margins { rows: vec![3.0, 5.0], cols: vec![4.0, 3.0], total: 7.0 };
        assert!(!bad.is_controlled_rounding_of(&original, 1e-9));
    }

    #[test]
    fn test_sub_block_and_rows() {
        let t = example();
        let s = t.sub_block(2, 3);
        assert_eq!(s.shape(), (2, 3));
        assert_eq!(s.row(1), &[1.21, 2.0, 2.83]);
        assert_eq!(t.to_rows()[2], vec![1.21, 0.2, 1.03, 0.5]);
    }
}
