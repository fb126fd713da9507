/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Injectable random stream.
//!
//! The rounder draws two kinds of randomness from a single stream per call:
//! a permutation of the fractional cells (so no cycle is systematically
//! preferred) and one Bernoulli draw per cycle (the adjustment direction).
//! Every [`rand::Rng`] is a [`RandomSource`]; seed a `ChaCha8Rng` for
//! reproducible output.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::table::Cell;

/// Source of the two random decisions the rounder makes.
pub trait RandomSource {
    /// Shuffle `cells` in place with a fresh uniform permutation.
    fn permute(&mut self, cells: &mut [Cell]);

    /// Return `true` with probability `p`. `p` is already clamped to `[0, 1]`.
    fn bernoulli(&mut self, p: f64) -> bool;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn permute(&mut self, cells: &mut [Cell]) {
        cells.shuffle(self);
    }

    fn bernoulli(&mut self, p: f64) -> bool {
        self.random_bool(p)
    }
}
