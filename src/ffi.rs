//! Python FFI bindings via PyO3.
//!
//! Exposes controlled rounding to Python on plain nested lists.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import ucr_core
//!
//! table = [[0.91, 0.7, 1.23, 0.1],
//!          [1.21, 2.0, 2.83, 0.2],
//!          [1.21, 0.2, 1.03, 0.5]]
//!
//! rounded = ucr_core.round_table(table, tolerance=0.0001, seed=42)
//! mean = ucr_core.simulate(table, trials=1000, seed=7)
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::RoundingError;
use crate::rng::RandomSource;
use crate::rounder::{round_table_with, RoundingConfig, DEFAULT_TOLERANCE};
use crate::table::Table;
use crate::trials;

fn to_py_err(e: RoundingError) -> PyErr {
    if e.is_invalid_input() {
        PyValueError::new_err(e.to_string())
    } else {
        PyRuntimeError::new_err(e.to_string())
    }
}

fn to_table(rows: &[Vec<f64>]) -> PyResult<Table> {
    Table::from_rows(rows).map_err(|e| to_py_err(e.into()))
}

/// Seeded ChaCha stream when `seed` is given, otherwise the thread generator.
fn with_stream<T>(seed: Option<u64>, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    match seed {
        Some(s) => f(&mut ChaCha8Rng::seed_from_u64(s)),
        None => f(&mut rand::rng()),
    }
}

/// Round a table of non-negative reals to integers with controlled margins.
///
/// Args:
///     table:     list of equal-length rows of non-negative floats
///     tolerance: settling tolerance in (0, 0.5) (default 0.0001)
///     seed:      optional u64 for a reproducible result
///
/// Returns:
///     list of rows of ints, same shape as `table`
#[pyfunction]
#[pyo3(signature = (table, tolerance=DEFAULT_TOLERANCE, seed=None))]
pub fn round_table(table: Vec<Vec<f64>>, tolerance: f64, seed: Option<u64>) -> PyResult<Vec<Vec<i64>>> {
    let table = to_table(&table)?;
    let config = RoundingConfig::new(tolerance);
    with_stream(seed, |rng| round_table_with(&table, &config, rng))
        .map(|r| r.to_rows())
        .map_err(to_py_err)
}

/// Round a table `trials` times and return the per-cell mean.
///
/// Args:
///     table:     list of equal-length rows of non-negative floats
///     trials:    number of independent roundings (≥ 1)
///     tolerance: settling tolerance in (0, 0.5) (default 0.0001)
///     seed:      optional u64 for a reproducible result
///
/// Returns:
///     list of rows of floats; compare with `table` to estimate bias
#[pyfunction]
#[pyo3(signature = (table, trials, tolerance=DEFAULT_TOLERANCE, seed=None))]
pub fn simulate(
    table: Vec<Vec<f64>>,
    trials: usize,
    tolerance: f64,
    seed: Option<u64>,
) -> PyResult<Vec<Vec<f64>>> {
    let table = to_table(&table)?;
    let config = RoundingConfig::new(tolerance);
    with_stream(seed, |rng| trials::simulate(&table, &config, trials, rng))
        .map(|s| s.mean.to_rows())
        .map_err(to_py_err)
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Unbiased controlled rounding: Python bindings.
#[pymodule]
pub fn ucr_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(round_table, m)?)?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("DEFAULT_TOLERANCE", DEFAULT_TOLERANCE)?;
    Ok(())
}
