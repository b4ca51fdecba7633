//! Red-black coloring and the tile sweep kernels.
//!
//! An interior point is red when its coordinate sum is even, black
//! otherwise. Every axis neighbour of a point has the opposite color, so
//! all points of one color can be relaxed concurrently while the other
//! color holds still. One sweep kernel per dimension serves every
//! execution strategy; tiling and scheduling vary as data, not as code.

use std::cell::UnsafeCell;

use crate::grid::{Dimension, Grid, SourceField};
use crate::tiling::Tile;

/// The two relaxation colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Coordinate sum even
    Red,
    /// Coordinate sum odd
    Black,
}

impl Color {
    /// Sweep order within one iteration.
    pub const SWEEP: [Color; 2] = [Color::Red, Color::Black];

    /// Coordinate-sum parity of this color.
    #[inline]
    pub fn parity(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
        }
    }

    /// Color of an interior index tuple. Axes beyond `dim` are ignored.
    #[inline]
    pub fn of(dim: Dimension, c: [usize; 3]) -> Color {
        let sum: usize = c[..dim.ndim()].iter().sum();
        if sum % 2 == 0 { Color::Red } else { Color::Black }
    }
}

/// First coordinate `>= start` whose total coordinate sum matches `color`,
/// given the sum `prefix` of the remaining coordinates. The kernels then
/// step by 2 along the fastest-varying axis. Shared by 2D and 3D.
#[inline]
pub(crate) fn first_of_color(prefix: usize, start: usize, color: Color) -> usize {
    start + ((prefix + start + color.parity()) & 1)
}

/// Shared mutable view of the solution buffer for the sweep kernels.
///
/// Safety contract: between two barriers, concurrent writers touch
/// disjoint cells (one color, disjoint tiles) and reads target the
/// opposite color only, so no cell is read and written in the same phase.
pub(crate) struct FieldCells(UnsafeCell<Vec<f64>>);

unsafe impl Sync for FieldCells {}

impl FieldCells {
    /// Take the buffer out of `grid` for the duration of a solve.
    pub(crate) fn take(grid: &mut Grid) -> Self {
        Self(UnsafeCell::new(std::mem::take(grid.buffer_mut())))
    }

    /// Put the buffer back once all workers have been joined.
    pub(crate) fn restore(self, grid: &mut Grid) {
        *grid.buffer_mut() = self.0.into_inner();
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> f64 {
        unsafe { (&(*self.0.get()))[i] }
    }

    #[inline]
    pub(crate) fn set(&self, i: usize, val: f64) {
        unsafe {
            (&mut (*self.0.get()))[i] = val;
        }
    }

    /// Whole-buffer view for the convergence check.
    ///
    /// # Safety
    /// Callers must guarantee no concurrent writer, i.e. every other
    /// worker is parked at a barrier.
    pub(crate) unsafe fn as_slice(&self) -> &[f64] {
        unsafe { (*self.0.get()).as_slice() }
    }
}

/// Relax all points of `color` inside `tile`.
pub(crate) fn sweep_tile(
    cells: &FieldCells,
    source: &SourceField,
    h2: f64,
    tile: &Tile,
    color: Color,
) {
    match source.dim() {
        Dimension::Two => sweep_tile_2d(cells, source, h2, tile, color),
        Dimension::Three => sweep_tile_3d(cells, source, h2, tile, color),
    }
}

fn sweep_tile_2d(cells: &FieldCells, source: &SourceField, h2: f64, tile: &Tile, color: Color) {
    let stride = source.n() + 2;
    for i in tile.lo[0]..tile.hi[0] {
        let row = i * stride;
        let mut j = first_of_color(i, tile.lo[1], color);
        while j < tile.hi[1] {
            let c = row + j;
            let u_im = cells.get(c - stride);
            let u_ip = cells.get(c + stride);
            let u_jm = cells.get(c - 1);
            let u_jp = cells.get(c + 1);
            let f_val = h2 * source.values()[source.idx2(i, j)];
            cells.set(c, 0.25 * (u_im + u_ip + u_jm + u_jp + f_val));
            j += 2;
        }
    }
}

fn sweep_tile_3d(cells: &FieldCells, source: &SourceField, h2: f64, tile: &Tile, color: Color) {
    const INV6: f64 = 1.0 / 6.0;
    let stride = source.n() + 2;
    let plane = stride * stride;
    for i in tile.lo[0]..tile.hi[0] {
        for j in tile.lo[1]..tile.hi[1] {
            let row = (i * stride + j) * stride;
            let mut k = first_of_color(i + j, tile.lo[2], color);
            while k < tile.hi[2] {
                let c = row + k;
                let u_im = cells.get(c - plane);
                let u_ip = cells.get(c + plane);
                let u_jm = cells.get(c - stride);
                let u_jp = cells.get(c + stride);
                let u_km = cells.get(c - 1);
                let u_kp = cells.get(c + 1);
                let f_val = h2 * source.values()[source.idx3(i, j, k)];
                cells.set(c, INV6 * (u_im + u_ip + u_jm + u_jp + u_km + u_kp + f_val));
                k += 2;
            }
        }
    }
}

/// Plain Gauss-Seidel sweep over the whole interior in lexicographic
/// order. Sequential only; kept as the convergence reference.
pub(crate) fn sweep_lexicographic(cells: &FieldCells, source: &SourceField, h2: f64) {
    let n = source.n();
    let stride = n + 2;
    match source.dim() {
        Dimension::Two => {
            for i in 1..=n {
                let row = i * stride;
                for j in 1..=n {
                    let c = row + j;
                    let sum =
                        cells.get(c - stride) + cells.get(c + stride) + cells.get(c - 1)
                            + cells.get(c + 1);
                    cells.set(c, 0.25 * (sum + h2 * source.values()[source.idx2(i, j)]));
                }
            }
        }
        Dimension::Three => {
            const INV6: f64 = 1.0 / 6.0;
            let plane = stride * stride;
            for i in 1..=n {
                for j in 1..=n {
                    let row = (i * stride + j) * stride;
                    for k in 1..=n {
                        let c = row + k;
                        let sum = cells.get(c - plane)
                            + cells.get(c + plane)
                            + cells.get(c - stride)
                            + cells.get(c + stride)
                            + cells.get(c - 1)
                            + cells.get(c + 1);
                        cells.set(c, INV6 * (sum + h2 * source.values()[source.idx3(i, j, k)]));
                    }
                }
            }
        }
    }
}
