//! Cache-aware tiling of the interior index space.
//!
//! [`plan`] partitions the interior `1..=n` box into rectangular (2D) or
//! cubic (3D) tiles that serve as the unit of parallel work assignment.
//! The tile edge balances two pressures:
//!
//! - a tile's working set (its points plus a one-cell halo) should fit
//!   the target cache level, so neighbour loads hit cache during a sweep;
//! - the tile count should be a small multiple of the worker count, so
//!   per-worker load stays balanced without drowning in dispatch overhead.
//!
//! Both [`tile_edge`] and [`plan`] are pure functions of their inputs and
//! are computed once per solve; the resulting tile list is reused every
//! iteration.

use crate::grid::Dimension;

/// A contiguous sub-box of the interior index space.
///
/// Bounds are per-axis, `lo` inclusive and `hi` exclusive, in 1-based
/// interior coordinates. Axes beyond the grid dimension are zeroed and
/// ignored by the kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Inclusive lower bounds
    pub lo: [usize; 3],
    /// Exclusive upper bounds
    pub hi: [usize; 3],
}

impl Tile {
    /// Number of interior points covered by this tile.
    pub fn points(&self, dim: Dimension) -> usize {
        (0..dim.ndim()).map(|a| self.hi[a] - self.lo[a]).product()
    }

    /// Whether the tile contains the interior coordinate `c`.
    pub fn contains(&self, dim: Dimension, c: [usize; 3]) -> bool {
        (0..dim.ndim()).all(|a| (self.lo[a]..self.hi[a]).contains(&c[a]))
    }
}

/// Tiling policy knobs. The defaults target a 256 KiB L2 slice and keep
/// at least four tiles per worker, matching the adaptive block sizes the
/// hand-tuned variants converged on.
#[derive(Debug, Clone)]
pub struct TilingConfig {
    /// Target cache working set per tile, in bytes.
    pub cache_bytes: usize,
    /// Keep shrinking the edge until each worker owns at least this many
    /// tiles (or the edge reaches `min_edge`).
    pub min_tiles_per_thread: usize,
    /// Smallest edge worth dispatching as a separate unit of work.
    pub min_edge: usize,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            cache_bytes: 256 * 1024,
            min_tiles_per_thread: 4,
            min_edge: 8,
        }
    }
}

/// Choose the tile edge length for an `n^d` interior swept by `threads`
/// workers.
///
/// Starts from the largest edge `t` whose `(t + 2)^d` working set of
/// doubles fits `cache_bytes`, then halves until the tile count reaches
/// `min_tiles_per_thread * threads`, stopping at `min_edge`. The result
/// never exceeds `n`.
pub fn tile_edge(n: usize, dim: Dimension, threads: usize, config: &TilingConfig) -> usize {
    let budget = (config.cache_bytes / std::mem::size_of::<f64>()).max(1);
    let from_cache = match dim {
        Dimension::Two => (budget as f64).sqrt(),
        Dimension::Three => (budget as f64).cbrt(),
    } as usize;

    let floor_edge = config.min_edge.min(n).max(1);
    let mut edge = from_cache.saturating_sub(2).clamp(floor_edge, n.max(1));

    let target_tiles = config.min_tiles_per_thread.max(1) * threads.max(1);
    while edge > floor_edge && tile_count(n, dim, edge) < target_tiles {
        edge = (edge / 2).max(floor_edge);
    }
    edge
}

/// Total number of tiles produced by `plan` for a given edge.
fn tile_count(n: usize, dim: Dimension, edge: usize) -> usize {
    n.div_ceil(edge).pow(dim.ndim() as u32)
}

/// Per-axis `[lo, hi)` ranges, with a ragged final range when `edge` does
/// not divide `n`.
fn axis_ranges(n: usize, edge: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::with_capacity(n.div_ceil(edge));
    let mut lo = 1;
    while lo <= n {
        let hi = (lo + edge).min(n + 1);
        ranges.push((lo, hi));
        lo = hi;
    }
    ranges
}

/// Partition the interior index space into tiles.
///
/// The returned tiles cover every interior point exactly once, in row-major
/// order of tile origin.
pub fn plan(n: usize, dim: Dimension, threads: usize, config: &TilingConfig) -> Vec<Tile> {
    let edge = tile_edge(n, dim, threads, config);
    let ranges = axis_ranges(n, edge);

    let mut tiles = Vec::with_capacity(tile_count(n, dim, edge));
    match dim {
        Dimension::Two => {
            for &(ilo, ihi) in &ranges {
                for &(jlo, jhi) in &ranges {
                    tiles.push(Tile {
                        lo: [ilo, jlo, 0],
                        hi: [ihi, jhi, 0],
                    });
                }
            }
        }
        Dimension::Three => {
            for &(ilo, ihi) in &ranges {
                for &(jlo, jhi) in &ranges {
                    for &(klo, khi) in &ranges {
                        tiles.push(Tile {
                            lo: [ilo, jlo, klo],
                            hi: [ihi, jhi, khi],
                        });
                    }
                }
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every interior coordinate must be covered by exactly one tile.
    fn assert_exact_partition(n: usize, dim: Dimension, tiles: &[Tile]) {
        let interior = n.pow(dim.ndim() as u32);
        let covered: usize = tiles.iter().map(|t| t.points(dim)).sum();
        assert_eq!(covered, interior, "tiles must cover n={n} exactly once");

        // Spot-check membership counts, including edges and corners
        let probes: Vec<[usize; 3]> = match dim {
            Dimension::Two => vec![[1, 1, 0], [1, n, 0], [n, 1, 0], [n, n, 0], [n / 2 + 1, 1, 0]],
            Dimension::Three => vec![[1, 1, 1], [n, n, n], [1, n, n / 2 + 1], [n / 2 + 1, 1, n]],
        };
        for c in probes {
            let owners = tiles.iter().filter(|t| t.contains(dim, c)).count();
            assert_eq!(owners, 1, "coordinate {c:?} owned by {owners} tiles");
        }
    }

    #[test]
    fn test_partition_is_exact_2d() {
        let config = TilingConfig::default();
        for n in [1, 7, 8, 31, 64, 100] {
            for threads in [1, 4] {
                let tiles = plan(n, Dimension::Two, threads, &config);
                assert_exact_partition(n, Dimension::Two, &tiles);
            }
        }
    }

    #[test]
    fn test_partition_is_exact_3d() {
        let config = TilingConfig::default();
        for n in [1, 5, 15, 33] {
            for threads in [1, 8] {
                let tiles = plan(n, Dimension::Three, threads, &config);
                assert_exact_partition(n, Dimension::Three, &tiles);
            }
        }
    }

    #[test]
    fn test_ragged_edges_are_covered() {
        // Force a small edge so n = 31 produces ragged final tiles
        let config = TilingConfig {
            cache_bytes: 8 * 8 * 10 * 10,
            min_edge: 4,
            ..TilingConfig::default()
        };
        let tiles = plan(31, Dimension::Two, 2, &config);
        assert_exact_partition(31, Dimension::Two, &tiles);
        assert!(
            tiles.iter().any(|t| t.points(Dimension::Two) < tiles[0].points(Dimension::Two)),
            "expected at least one ragged tile for n=31"
        );
    }

    #[test]
    fn test_tile_edge_respects_cache_budget() {
        let config = TilingConfig::default();
        let budget = config.cache_bytes / std::mem::size_of::<f64>();

        let edge = tile_edge(4096, Dimension::Two, 1, &config);
        assert!((edge + 2) * (edge + 2) <= budget);

        let edge = tile_edge(512, Dimension::Three, 1, &config);
        assert!((edge + 2).pow(3) <= budget);
    }

    #[test]
    fn test_tile_edge_feeds_all_threads() {
        let config = TilingConfig::default();
        for &threads in &[2, 8, 16] {
            let edge = tile_edge(256, Dimension::Two, threads, &config);
            let count = 256usize.div_ceil(edge).pow(2);
            assert!(
                count >= config.min_tiles_per_thread * threads,
                "{count} tiles cannot feed {threads} workers"
            );
        }
    }

    #[test]
    fn test_tile_edge_clamped_to_grid() {
        let config = TilingConfig::default();
        assert_eq!(tile_edge(4, Dimension::Two, 1, &config), 4);
        assert_eq!(tile_edge(1, Dimension::Three, 8, &config), 1);
    }
}
