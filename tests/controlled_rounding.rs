//! Integration tests for the controlled rounding engine.
//!
//! Every test uses a seeded ChaCha stream so failures reproduce exactly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ucr_core::{
    round_table, round_table_with, Cell, ControlledRounder, InvalidInput, InvariantViolation, Margins,
    RandomSource, RoundedTable, RoundingConfig, RoundingError, Table, MAX_ENTRY,
};

// ─── helpers ─────────────────────────────────────────────────────────────────

fn example() -> Table {
    Table::from_rows(&[
        [0.91, 0.7, 1.23, 0.1],
        [1.21, 2.0, 2.83, 0.2],
        [1.21, 0.2, 1.03, 0.5],
    ])
    .unwrap()
}

fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn round_seeded(table: &Table, seed: u64) -> RoundedTable {
    round_table_with(table, &RoundingConfig::default(), &mut seeded(seed)).unwrap()
}

/// Every cell must sit on the floor or ceiling of its original value.
fn assert_unit_deviation(input: &Table, output: &RoundedTable) {
    assert_eq!(input.shape(), output.shape());
    for ((cell, a), (_, r)) in input.cells().zip(output.cells()) {
        let r = r as f64;
        assert!((r - a).abs() < 1.0, "cell {:?}: {} rounded to {}", cell, a, r);
        assert!(r == a.floor() || r == a.ceil(), "cell {:?}: {} is not floor/ceil of {}", cell, r, a);
    }
}

// ─── margins ─────────────────────────────────────────────────────────────────

/// Output margins are floor or ceiling of the input margins, and integral
/// input margins are reproduced exactly.
#[test]
fn test_margins_are_controlled() {
    let input = example();
    for seed in 0..50 {
        let output = round_seeded(&input, seed);
        let before = Margins::of(&input);
        let after = Margins::of_rounded(&output);
        assert!(
            after.is_controlled_rounding_of(&before, 1e-6),
            "seed {}: margins {:?} do not control {:?}",
            seed,
            after,
            before
        );
    }
}

/// Rows, columns and total of the output are mutually consistent integers.
#[test]
fn test_margins_add_up() {
    let output = round_seeded(&example(), 3);
    let m = Margins::of_rounded(&output);
    let rows: f64 = m.rows.iter().sum();
    let cols: f64 = m.cols.iter().sum();
    assert_eq!(rows, m.total);
    assert_eq!(cols, m.total);
}

// ─── cells ───────────────────────────────────────────────────────────────────

#[test]
fn test_bounded_deviation() {
    let input = example();
    for seed in 0..50 {
        assert_unit_deviation(&input, &round_seeded(&input, seed));
    }
}

/// An integral cell is never on a cycle, so it is never moved.
#[test]
fn test_integral_cells_are_untouched() {
    let input = example();
    for seed in 0..20 {
        assert_eq!(round_seeded(&input, seed).get(1, 1), 2);
    }
}

// ─── determinism ─────────────────────────────────────────────────────────────

#[test]
fn test_same_seed_same_output() {
    let input = example();
    assert_eq!(round_seeded(&input, 42), round_seeded(&input, 42));
}

#[test]
fn test_different_seeds_reach_different_roundings() {
    let input = example();
    let first = round_seeded(&input, 0);
    assert!(
        (1..100).any(|s| round_seeded(&input, s) != first),
        "100 seeds all produced the same rounding"
    );
}

// ─── integral input ──────────────────────────────────────────────────────────

#[test]
fn test_integral_input_is_returned_unchanged() {
    let input = Table::from_rows(&[[1.0, 0.0, 4.0], [2.0, 7.0, 3.0]]).unwrap();
    let out = ControlledRounder::default().round(&input, &mut seeded(1)).unwrap();
    assert_eq!(out.table.to_rows(), vec![vec![1, 0, 4], vec![2, 7, 3]]);
    assert_eq!(out.stats.iterations, 0);
    assert_eq!(out.stats.initial_fractional_cells, 0);
}

#[test]
fn test_single_integral_row_among_zeros() {
    let input = Table::from_rows(&[[0.0, 0.0, 0.0], [3.0, 1.0, 5.0], [0.0, 0.0, 0.0]]).unwrap();
    let out = round_seeded(&input, 8);
    assert_eq!(out, input.map(|v| v as i64));
}

// ─── worked example ──────────────────────────────────────────────────────────

/// Row sums 2.94, 6.24, 2.94; column sums 3.33, 2.9, 5.09, 0.8.
#[test]
fn test_worked_example() {
    let input = example();
    let out = round_seeded(&input, 1987);
    let m = Margins::of_rounded(&out);

    let row_choices = [[2.0, 3.0], [6.0, 7.0], [2.0, 3.0]];
    for (i, (s, ok)) in m.rows.iter().zip(row_choices).enumerate() {
        assert!(ok.contains(s), "row {} sums to {}", i, s);
    }
    let col_choices = [[3.0, 4.0], [2.0, 3.0], [5.0, 6.0], [0.0, 1.0]];
    for (j, (s, ok)) in m.cols.iter().zip(col_choices).enumerate() {
        assert!(ok.contains(s), "col {} sums to {}", j, s);
    }
    assert!(m.total == 12.0 || m.total == 13.0, "total {}", m.total);
    assert_unit_deviation(&input, &out);
}

#[test]
fn test_default_entry_point() {
    let input = example();
    let out = round_table(&input, 0.0001).unwrap();
    assert_unit_deviation(&input, &out);
    // Input is borrowed immutably and left as it was.
    assert_eq!(input, example());
}

#[test]
fn test_single_cell_table() {
    let input = Table::from_rows(&[[2.5]]).unwrap();
    for seed in 0..10 {
        let v = round_seeded(&input, seed).get(0, 0);
        assert!(v == 2 || v == 3, "2.5 rounded to {}", v);
    }
}

// ─── scripted randomness ─────────────────────────────────────────────────────

/// Deterministic stream: reverses the cells and always picks Minus.
struct AlwaysMinus;

impl RandomSource for AlwaysMinus {
    fn permute(&mut self, cells: &mut [Cell]) {
        cells.reverse();
    }
    fn bernoulli(&mut self, _p: f64) -> bool {
        true
    }
}

#[test]
fn test_custom_random_source() {
    let input = example();
    let a = round_table_with(&input, &RoundingConfig::default(), &mut AlwaysMinus).unwrap();
    let b = round_table_with(&input, &RoundingConfig::default(), &mut AlwaysMinus).unwrap();
    assert_eq!(a, b);
    assert_unit_deviation(&input, &a);
    assert!(Margins::of_rounded(&a).is_controlled_rounding_of(&Margins::of(&input), 1e-6));
}

// ─── errors ──────────────────────────────────────────────────────────────────

#[test]
fn test_negative_entry_rejected() {
    let input = Table::from_rows(&[[0.5, -0.1]]).unwrap();
    let err = round_table(&input, 0.0001).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(matches!(
        err,
        RoundingError::InvalidInput(InvalidInput::NegativeEntry { row: 0, col: 1, .. })
    ));
}

#[test]
fn test_non_finite_entries_rejected() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let input = Table::from_rows(&[[1.0], [bad]]).unwrap();
        let err = round_table(&input, 0.0001).unwrap_err();
        assert!(
            matches!(err, RoundingError::InvalidInput(InvalidInput::NonFiniteEntry { row: 1, col: 0, .. })),
            "{} gave {:?}",
            bad,
            err
        );
    }
}

#[test]
fn test_huge_entry_rejected_not_saturated() {
    let input = Table::from_rows(&[[1e19]]).unwrap();
    let err = round_table_with(&input, &RoundingConfig::default(), &mut seeded(1)).unwrap_err();
    assert!(matches!(
        err,
        RoundingError::InvalidInput(InvalidInput::EntryTooLarge { row: 0, col: 0, .. })
    ));

    let input = Table::from_rows(&[[MAX_ENTRY]]).unwrap();
    assert_eq!(round_seeded(&input, 1).get(0, 0), 1 << 53);

    let input = Table::from_rows(&[[1e12 + 0.25, 0.75]]).unwrap();
    let out = round_seeded(&input, 1);
    assert!([1_000_000_000_000, 1_000_000_000_001].contains(&out.get(0, 0)), "{:?}", out);
    assert_eq!(out.get(0, 0) + out.get(0, 1), 1_000_000_000_001);
}

/// A wide tolerance can leave fractional cells that share a column but
/// close no cycle: `0.4` and its slack `0.6` form a bare path.
#[test]
fn test_acyclic_fractional_graph_surfaces_no_cycle() {
    let input = Table::from_rows(&[[0.3, 0.3, 0.4]]).unwrap();
    let err = round_table_with(&input, &RoundingConfig::new(0.35), &mut seeded(2)).unwrap_err();
    assert!(err.is_invariant_violation());
    assert_eq!(
        err,
        RoundingError::InvariantViolation(InvariantViolation::NoCycle { fractional_cells: 2 })
    );
}

#[test]
fn test_tolerance_outside_open_interval_rejected() {
    for tol in [0.0, 0.5, 0.75, -1e-4] {
        let err = round_table(&example(), tol).unwrap_err();
        assert_eq!(err, RoundingError::InvalidInput(InvalidInput::Tolerance(tol)));
    }
}

#[test]
fn test_ragged_and_empty_tables_rejected() {
    assert!(matches!(
        Table::from_rows(&[vec![0.5, 0.5], vec![0.5]]),
        Err(InvalidInput::RaggedRow { row: 1, .. })
    ));
    let empty: Vec<Vec<f64>> = vec![];
    assert!(matches!(Table::from_rows(&empty), Err(InvalidInput::EmptyTable { .. })));
}

#[test]
fn test_iteration_cap_reports_non_convergence() {
    let config = RoundingConfig::default().with_max_iterations(1);
    let err = round_table_with(&example(), &config, &mut seeded(5)).unwrap_err();
    match err {
        RoundingError::NonConvergence { iterations, fractional_cells } => {
            assert_eq!(iterations, 1);
            assert!(fractional_cells > 0);
        }
        other => panic!("expected NonConvergence, got {:?}", other),
    }
}
