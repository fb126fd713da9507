//! # Unbiased Controlled Rounding: Bias Simulation
//!
//! Rounds a small 3×4 table once, then 1,000 more times, and shows that the
//! mean of the rounded tables converges on the original values while every
//! individual result keeps integer, additive margins.
//!
//! Run with: `cargo run --example bias_simulation`

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ucr_core::{simulate, ControlledRounder, Margins, Matrix, RoundingConfig, Table};

const TRIALS: usize = 1000;

// ── Display helpers ───────────────────────────────────────────────────────────

fn print_real(label: &str, m: &Matrix<f64>) {
    println!("  {}", label);
    for r in m.iter_rows() {
        let cells: Vec<String> = r.iter().map(|v| format!("{:>7.3}", v)).collect();
        println!("    [{} ]", cells.join(""));
    }
    println!();
}

fn print_int(label: &str, m: &Matrix<i64>) {
    println!("  {}", label);
    for r in m.iter_rows() {
        let cells: Vec<String> = r.iter().map(|v| format!("{:>7}", v)).collect();
        println!("    [{} ]", cells.join(""));
    }
    println!();
}

fn print_margins(label: &str, m: &Margins) {
    let fmt = |xs: &[f64]| xs.iter().map(|x| format!("{:.2}", x)).collect::<Vec<_>>().join(", ");
    println!(
        "  {:<10} rows [{}]  cols [{}]  total {:.2}",
        label,
        fmt(m.rows.as_slice()),
        fmt(m.cols.as_slice()),
        m.total
    );
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Unbiased controlled rounding: {:>5} trial bias simulation          ║", TRIALS);
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let table = Table::from_rows(&[
        [0.91, 0.7, 1.23, 0.1],
        [1.21, 2.0, 2.83, 0.2],
        [1.21, 0.2, 1.03, 0.5],
    ])
    .expect("example table is rectangular");

    let config = RoundingConfig::default();
    let rounder = ControlledRounder::new(config.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(1987);

    print_real("Original table", &table);

    // ── One rounding ─────────────────────────────────────────────────────────
    let outcome = rounder.round(&table, &mut rng).expect("rounding failed");
    print_int("One controlled rounding", &outcome.table);

    let before = Margins::of(&table);
    let after = Margins::of_rounded(&outcome.table);
    print_margins("input", &before);
    print_margins("rounded", &after);
    println!(
        "  controlled: {}   cycles adjusted: {}   longest cycle: {}\n",
        after.is_controlled_rounding_of(&before, config.tolerance),
        outcome.stats.iterations,
        outcome.stats.longest_cycle,
    );

    // ── Many roundings ───────────────────────────────────────────────────────
    let summary = simulate(&table, &config, TRIALS, &mut rng).expect("simulation failed");
    print_real(&format!("Mean over {} trials", TRIALS), &summary.mean);
    print_real("Bias (original − mean)", &summary.bias);
    println!(
        "  max |bias| = {:.4}   mean cycles per trial = {:.2}",
        summary.max_abs_bias(),
        summary.mean_iterations()
    );
}
