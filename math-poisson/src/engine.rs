//! Iteration loop drivers: a sequential loop and a persistent worker team.
//!
//! The parallel driver spawns its workers once per solve and keeps them
//! for every iteration. Each iteration runs as a fixed barrier protocol:
//!
//! ```text
//! red half-sweep   -> barrier
//! black half-sweep -> barrier
//! (periodic) worker 0 computes the residual and stores the stop flag
//!                  -> barrier -> every worker reads the flag
//! ```
//!
//! Within a half-sweep, workers write disjoint tiles of a single color and
//! read only the opposite color, so no cell is read and written in the
//! same phase. The stop flag is written strictly between the post-black
//! and post-check barriers, while every other worker is parked, and read
//! only after the post-check barrier. No worker ever acts on a flag value
//! that a barrier has not published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;

use crate::grid::{Grid, SourceField};
use crate::residual::residual_norm_parts;
use crate::solver::SweepOrdering;
use crate::stencil::{sweep_lexicographic, sweep_tile, Color, FieldCells};
use crate::tiling::Tile;

/// Result of an iteration loop.
pub(crate) struct SweepOutcome {
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
}

/// Loop parameters shared by both drivers. `check_interval` is already
/// resolved to a positive value by the caller.
pub(crate) struct LoopParams<'a> {
    pub h: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub check_interval: usize,
    pub print_interval: usize,
    pub tiles: &'a [Tile],
}

impl LoopParams<'_> {
    /// A check runs every `check_interval` iterations and always on the
    /// final allowed iteration.
    #[inline]
    fn is_check(&self, iter: usize) -> bool {
        (iter + 1) % self.check_interval == 0 || iter + 1 == self.max_iterations
    }
}

fn log_check(print_interval: usize, iter: usize, residual: f64) {
    if print_interval > 0 && (iter + 1) % print_interval == 0 {
        log::info!(
            "red-black iteration {}: residual = {:.6e}",
            iter + 1,
            residual
        );
    }
}

/// Sequential driver. Handles both sweep orderings; the red-black path
/// walks the same tile list as the parallel driver.
pub(crate) fn run_serial(
    grid: &mut Grid,
    source: &SourceField,
    ordering: SweepOrdering,
    params: &LoopParams<'_>,
) -> SweepOutcome {
    let dim = grid.dim();
    let n = grid.n();
    let h2 = params.h * params.h;

    let cells = FieldCells::take(grid);
    let mut outcome = SweepOutcome {
        iterations: params.max_iterations,
        residual: f64::INFINITY,
        converged: false,
    };

    for iter in 0..params.max_iterations {
        match ordering {
            SweepOrdering::RedBlack => {
                for color in Color::SWEEP {
                    for tile in params.tiles {
                        sweep_tile(&cells, source, h2, tile, color);
                    }
                }
            }
            SweepOrdering::Lexicographic => sweep_lexicographic(&cells, source, h2),
        }

        if params.is_check(iter) {
            let u = unsafe { cells.as_slice() };
            let residual = residual_norm_parts(u, source.values(), dim, n, params.h);
            log_check(params.print_interval, iter, residual);
            outcome.residual = residual;
            if residual < params.tolerance {
                outcome.iterations = iter + 1;
                outcome.converged = true;
                break;
            }
        }
    }

    cells.restore(grid);
    outcome
}

/// Parallel driver: a persistent team of `threads` workers over a fixed
/// round-robin tile assignment.
pub(crate) fn run_parallel(
    grid: &mut Grid,
    source: &SourceField,
    threads: usize,
    params: &LoopParams<'_>,
) -> SweepOutcome {
    let dim = grid.dim();
    let n = grid.n();
    let h2 = params.h * params.h;

    let cells = FieldCells::take(grid);
    let barrier = Barrier::new(threads);
    let stop = AtomicBool::new(false);

    let outcome = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        for worker in 0..threads {
            let cells = &cells;
            let barrier = &barrier;
            let stop = &stop;

            handles.push(scope.spawn(move || {
                let mine: Vec<&Tile> = params
                    .tiles
                    .iter()
                    .enumerate()
                    .filter(|(t, _)| t % threads == worker)
                    .map(|(_, tile)| tile)
                    .collect();

                // Only worker 0 fills this in; the others hand back None.
                let mut report = SweepOutcome {
                    iterations: params.max_iterations,
                    residual: f64::INFINITY,
                    converged: false,
                };

                for iter in 0..params.max_iterations {
                    for tile in &mine {
                        sweep_tile(cells, source, h2, tile, Color::Red);
                    }
                    barrier.wait();

                    for tile in &mine {
                        sweep_tile(cells, source, h2, tile, Color::Black);
                    }
                    barrier.wait();

                    if params.is_check(iter) {
                        if worker == 0 {
                            // Every other worker is parked at the barrier
                            // below; the field is quiescent.
                            let u = unsafe { cells.as_slice() };
                            let residual =
                                residual_norm_parts(u, source.values(), dim, n, params.h);
                            log_check(params.print_interval, iter, residual);

                            report.residual = residual;
                            if residual < params.tolerance {
                                report.iterations = iter + 1;
                                report.converged = true;
                                stop.store(true, Ordering::SeqCst);
                            }
                        }
                        // Publishes the flag to every worker before any of
                        // them can start the next red half-sweep.
                        barrier.wait();
                        if stop.load(Ordering::SeqCst) {
                            break;
                        }
                    }
                }

                if worker == 0 { Some(report) } else { None }
            }));
        }

        handles
            .into_iter()
            .filter_map(|handle| handle.join().expect("solver worker panicked"))
            .next()
            .expect("worker 0 reports the outcome")
    });

    cells.restore(grid);
    outcome
}
