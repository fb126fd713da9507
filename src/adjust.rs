/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Randomised adjustment along one cycle.
//!
//! Two directions are possible:
//!
//! ```text
//! Minus: even cells −d_minus, odd cells +d_minus
//! Plus:  even cells +d_plus,  odd cells −d_plus
//! ```
//!
//! `d_minus` / `d_plus` are the largest steps that keep every cell on the
//! cycle between its current floor and ceiling. Choosing Minus with
//! probability `d_plus / (d_plus + d_minus)` makes the expected change of
//! every cell zero:
//!
//! ```text
//! p_minus · (−d_minus) + p_plus · d_plus = 0
//! ```
//!
//! Consecutive cells share a row or column and move in opposite directions,
//! so every margin is unchanged. At least one cell lands on an integer.

use crate::augment::AugmentedTable;
use crate::cycle::Cycle;
use crate::error::InvariantViolation;
use crate::rng::RandomSource;
use crate::table::frac;

/// Which way the cycle was moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Even cells down, odd cells up.
    Minus,
    /// Even cells up, odd cells down.
    Plus,
}

/// Maximal admissible steps in each direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSizes {
    /// Largest step for [`Direction::Minus`].
    pub d_minus: f64,
    /// Largest step for [`Direction::Plus`].
    pub d_plus: f64,
}

impl StepSizes {
    /// Probability of choosing [`Direction::Minus`].
    ///
    /// Errors when both steps are zero or either is not finite.
    pub fn p_minus(&self, cycle_len: usize) -> Result<f64, InvariantViolation> {
        let sum = self.d_plus + self.d_minus;
        if !(sum.is_finite() && sum > 0.0) {
            return Err(InvariantViolation::ZeroStep { cycle_len });
        }
        Ok((self.d_plus / sum).clamp(0.0, 1.0))
    }

    /// Step length for `direction`.
    pub fn step(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Minus => self.d_minus,
            Direction::Plus => self.d_plus,
        }
    }
}

/// Compute `d_minus` and `d_plus` for `cycle` on the current table.
pub fn step_sizes(table: &AugmentedTable, cycle: &Cycle) -> StepSizes {
    let mut steps = StepSizes { d_minus: 1.0, d_plus: 1.0 };
    for (cell, even) in cycle.roles() {
        let f = frac(table.get(cell));
        let (down, up) = (f, 1.0 - f);
        let (minus, plus) = if even { (down, up) } else { (up, down) };
        steps.d_minus = steps.d_minus.min(minus);
        steps.d_plus = steps.d_plus.min(plus);
    }
    steps
}

/// Move `cycle` by `step` in `direction`.
pub fn apply(table: &mut AugmentedTable, cycle: &Cycle, direction: Direction, step: f64) {
    let signed = match direction {
        Direction::Minus => -step,
        Direction::Plus => step,
    };
    for (cell, even) in cycle.roles() {
        table.add(cell, if even { signed } else { -signed });
    }
}

/// Pick a direction at random and move the cycle.
///
/// Returns the direction taken and the step applied.
pub fn adjust_cycle<R: RandomSource + ?Sized>(
    table: &mut AugmentedTable,
    cycle: &Cycle,
    rng: &mut R,
) -> Result<(Direction, f64), InvariantViolation> {
    let steps = step_sizes(table, cycle);
    let p_minus = steps.p_minus(cycle.len())?;
    let direction = if rng.bernoulli(p_minus) { Direction::Minus } else { Direction::Plus };
    let step = steps.step(direction);
    apply(table, cycle, direction, step);
    Ok((direction, step))
}
