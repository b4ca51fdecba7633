//! Red-black Gauss-Seidel scaling analysis
//!
//! Prints a table showing how fixed-iteration sweep time scales with grid
//! size and worker count.
//!
//! Run with:
//!   cargo run -p math-poisson --example scaling --release

use math_poisson::{manufactured_problem, relative_l2_error, solve, Dimension, SolverConfig};
use std::time::Instant;

fn main() {
    println!();
    println!("=== Red-Black Gauss-Seidel Scaling Analysis ===");
    println!();
    println!("Problem: -Δu = f in the unit square with Dirichlet boundaries");
    println!("Manufactured solution: u = sin(πx) sin(πy)");
    println!();

    println!(
        "{:>6} {:>8} {:>10} {:>12} {:>12} {:>12} {:>10}",
        "n", "threads", "iters", "residual", "rel. error", "solve(ms)", "conv"
    );
    println!("{}", "-".repeat(76));

    for &n in &[63, 127, 255] {
        let h = 1.0 / (n as f64 + 1.0);

        for &threads in &[1, 2, 4, 8] {
            let mut problem = match manufactured_problem(Dimension::Two, n, h) {
                Ok(problem) => problem,
                Err(err) => {
                    eprintln!("setup failed for n={n}: {err}");
                    return;
                }
            };

            let config = SolverConfig {
                max_iterations: 20_000,
                tolerance: 1e-8,
                threads,
                ..Default::default()
            };

            let start = Instant::now();
            let solution = match solve(&mut problem.field, &problem.source, h, &config) {
                Ok(solution) => solution,
                Err(err) => {
                    eprintln!("solve failed for n={n}, threads={threads}: {err}");
                    return;
                }
            };
            let elapsed = start.elapsed();

            let error = relative_l2_error(&problem.field, &problem.exact);
            println!(
                "{:>6} {:>8} {:>10} {:>12.2e} {:>12.2e} {:>12.1} {:>10}",
                n,
                threads,
                solution.iterations,
                solution.residual,
                error,
                elapsed.as_secs_f64() * 1000.0,
                if solution.converged { "yes" } else { "NO" }
            );
        }
    }

    println!();
}
