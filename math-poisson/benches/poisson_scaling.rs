//! Benchmark: red-black Gauss-Seidel sweep and residual scaling
//!
//! Measures fixed-iteration sweep throughput over grid size and worker
//! count, plus the cost of one residual reduction.
//!
//! Run with:
//!   cargo bench -p math-poisson --bench poisson_scaling

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use math_poisson::{manufactured_problem, residual_norm, solve, Dimension, SolverConfig};
use std::time::Duration;

/// 100 fixed sweeps, sequential, over growing 2D grids.
fn bench_2d_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("redblack_2d");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for &n in &[63, 127, 255] {
        let h = 1.0 / (n as f64 + 1.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("fixed_100_iters", n), &n, |b, &n| {
            b.iter_batched(
                || manufactured_problem(Dimension::Two, n, h).unwrap(),
                |mut problem| {
                    let config = SolverConfig {
                        max_iterations: 100,
                        tolerance: 0.0,
                        ..Default::default()
                    };
                    let solution =
                        solve(&mut problem.field, &problem.source, h, &config).unwrap();
                    black_box(solution)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Thread scaling at a fixed 2D size.
fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_scaling_2d");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let n = 255;
    let h = 1.0 / (n as f64 + 1.0);
    group.throughput(Throughput::Elements((n * n) as u64));

    for &threads in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("fixed_100_iters", threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || manufactured_problem(Dimension::Two, n, h).unwrap(),
                    |mut problem| {
                        let config = SolverConfig {
                            max_iterations: 100,
                            tolerance: 0.0,
                            threads,
                            ..Default::default()
                        };
                        let solution =
                            solve(&mut problem.field, &problem.source, h, &config).unwrap();
                        black_box(solution)
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

/// 3D sweeps at moderate sizes.
fn bench_3d_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("redblack_3d");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(10);

    for &n in &[15, 31, 47] {
        let h = 1.0 / (n as f64 + 1.0);
        group.throughput(Throughput::Elements((n * n * n) as u64));

        group.bench_with_input(BenchmarkId::new("fixed_50_iters", n), &n, |b, &n| {
            b.iter_batched(
                || manufactured_problem(Dimension::Three, n, h).unwrap(),
                |mut problem| {
                    let config = SolverConfig {
                        max_iterations: 50,
                        tolerance: 0.0,
                        threads: 4,
                        ..Default::default()
                    };
                    let solution =
                        solve(&mut problem.field, &problem.source, h, &config).unwrap();
                    black_box(solution)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// One full residual reduction.
fn bench_residual(c: &mut Criterion) {
    let mut group = c.benchmark_group("residual_norm");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for &n in &[127, 255, 511] {
        let h = 1.0 / (n as f64 + 1.0);
        let problem = manufactured_problem(Dimension::Two, n, h).unwrap();
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(
            BenchmarkId::new("2d", n),
            &problem,
            |b, problem| {
                b.iter(|| black_box(residual_norm(&problem.field, &problem.source, h)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_2d_sweeps,
    bench_thread_scaling,
    bench_3d_sweeps,
    bench_residual,
);

criterion_main!(benches);
