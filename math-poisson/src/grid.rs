//! Dense field storage for structured 2D/3D grids.
//!
//! The solution field is a flat contiguous buffer of `(n + 2)^d` doubles
//! with a one-cell halo on every axis; the source term is a flat `n^d`
//! buffer over the interior only. Interior coordinates are 1-based,
//! `1..=n` per axis, so that halo cells sit at coordinate `0` and `n + 1`.
//! All indexing goes through explicit per-dimension stride arithmetic.

use crate::error::{Result, SolverError};

/// Spatial dimensionality of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// 2D grid, 5-point stencil
    Two,
    /// 3D grid, 7-point stencil
    Three,
}

impl Dimension {
    /// Number of axes.
    #[inline]
    pub fn ndim(self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Number of axis-adjacent stencil neighbours (2d).
    #[inline]
    pub fn stencil_neighbors(self) -> usize {
        2 * self.ndim()
    }
}

/// Allocate a zero-initialized buffer, reporting failure instead of aborting.
fn alloc_zeroed(len: usize, n: usize, dim: Dimension) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| SolverError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<f64>()),
            n,
            dim: dim.ndim(),
        })?;
    data.resize(len, 0.0);
    Ok(data)
}

/// Solution field over `(n + 2)^d` cells, halo included.
///
/// The halo holds the Dirichlet boundary values (zero for the reference
/// problem) and is never written by a sweep.
#[derive(Debug, Clone)]
pub struct Grid {
    dim: Dimension,
    n: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Allocate a zero-initialized field of size `(n + 2)^d`.
    pub fn new(dim: Dimension, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SolverError::InvalidSize { n });
        }
        let len = n
            .checked_add(2)
            .and_then(|side| side.checked_pow(dim.ndim() as u32))
            .ok_or(SolverError::Allocation {
                bytes: usize::MAX,
                n,
                dim: dim.ndim(),
            })?;
        Ok(Self {
            dim,
            n,
            data: alloc_zeroed(len, n, dim)?,
        })
    }

    #[inline]
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Interior size per axis.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Edge length of the buffer, halo included (`n + 2`).
    #[inline]
    pub fn side(&self) -> usize {
        self.n + 2
    }

    /// Number of interior points, `n^d`.
    #[inline]
    pub fn interior_points(&self) -> usize {
        self.n.pow(self.dim.ndim() as u32)
    }

    /// The whole buffer, halo included, in stride order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<f64> {
        &mut self.data
    }

    /// Flat offset of `(i, j)`, valid for 2D grids.
    #[inline]
    pub(crate) fn idx2(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.side() && j < self.side());
        i * self.side() + j
    }

    /// Flat offset of `(i, j, k)`, valid for 3D grids.
    #[inline]
    pub(crate) fn idx3(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.side() && j < self.side() && k < self.side());
        (i * self.side() + j) * self.side() + k
    }

    #[inline]
    fn offset(&self, c: [usize; 3]) -> usize {
        match self.dim {
            Dimension::Two => self.idx2(c[0], c[1]),
            Dimension::Three => self.idx3(c[0], c[1], c[2]),
        }
    }

    /// Value at an interior or halo cell. Axes beyond the grid dimension
    /// are ignored.
    #[inline]
    pub fn at(&self, c: [usize; 3]) -> f64 {
        self.data[self.offset(c)]
    }

    /// Mutable reference to an interior or halo cell.
    #[inline]
    pub fn at_mut(&mut self, c: [usize; 3]) -> &mut f64 {
        let offset = self.offset(c);
        &mut self.data[offset]
    }

    /// Values of the `2d` axis-adjacent neighbours of an interior point,
    /// ordered `-axis0, +axis0, -axis1, +axis1[, -axis2, +axis2]`. For 2D
    /// grids only the first four entries are meaningful.
    pub fn neighbors(&self, c: [usize; 3]) -> [f64; 6] {
        match self.dim {
            Dimension::Two => {
                debug_assert!((1..=self.n).contains(&c[0]) && (1..=self.n).contains(&c[1]));
                let s = self.side();
                let idx = self.idx2(c[0], c[1]);
                [
                    self.data[idx - s],
                    self.data[idx + s],
                    self.data[idx - 1],
                    self.data[idx + 1],
                    0.0,
                    0.0,
                ]
            }
            Dimension::Three => {
                debug_assert!(c[..3].iter().all(|&x| (1..=self.n).contains(&x)));
                let s = self.side();
                let plane = s * s;
                let idx = self.idx3(c[0], c[1], c[2]);
                [
                    self.data[idx - plane],
                    self.data[idx + plane],
                    self.data[idx - s],
                    self.data[idx + s],
                    self.data[idx - 1],
                    self.data[idx + 1],
                ]
            }
        }
    }
}

/// Right-hand side of the discrete equation, one value per interior point.
///
/// Indexed with the same 1-based interior coordinates as [`Grid`];
/// immutable during solving.
#[derive(Debug, Clone)]
pub struct SourceField {
    dim: Dimension,
    n: usize,
    data: Vec<f64>,
}

impl SourceField {
    /// Allocate a zero-initialized source term of size `n^d`.
    pub fn new(dim: Dimension, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SolverError::InvalidSize { n });
        }
        let len = n
            .checked_pow(dim.ndim() as u32)
            .ok_or(SolverError::Allocation {
                bytes: usize::MAX,
                n,
                dim: dim.ndim(),
            })?;
        Ok(Self {
            dim,
            n,
            data: alloc_zeroed(len, n, dim)?,
        })
    }

    #[inline]
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Flat offset of interior point `(i, j)`, valid for 2D.
    #[inline]
    pub(crate) fn idx2(&self, i: usize, j: usize) -> usize {
        debug_assert!((1..=self.n).contains(&i) && (1..=self.n).contains(&j));
        (i - 1) * self.n + (j - 1)
    }

    /// Flat offset of interior point `(i, j, k)`, valid for 3D.
    #[inline]
    pub(crate) fn idx3(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!([i, j, k].iter().all(|&x| (1..=self.n).contains(&x)));
        ((i - 1) * self.n + (j - 1)) * self.n + (k - 1)
    }

    #[inline]
    fn offset(&self, c: [usize; 3]) -> usize {
        match self.dim {
            Dimension::Two => self.idx2(c[0], c[1]),
            Dimension::Three => self.idx3(c[0], c[1], c[2]),
        }
    }

    /// Value at an interior point.
    #[inline]
    pub fn at(&self, c: [usize; 3]) -> f64 {
        self.data[self.offset(c)]
    }

    /// Mutable reference to an interior point's value.
    #[inline]
    pub fn at_mut(&mut self, c: [usize; 3]) -> &mut f64 {
        let offset = self.offset(c);
        &mut self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_allocation_sizes() {
        let g = Grid::new(Dimension::Two, 8).unwrap();
        assert_eq!(g.values().len(), 10 * 10);
        assert_eq!(g.interior_points(), 64);

        let g = Grid::new(Dimension::Three, 4).unwrap();
        assert_eq!(g.values().len(), 6 * 6 * 6);
        assert_eq!(g.interior_points(), 64);
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = Grid::new(Dimension::Two, 0).unwrap_err();
        assert!(matches!(err, SolverError::InvalidSize { n: 0 }));
        assert!(SourceField::new(Dimension::Three, 0).is_err());
    }

    #[test]
    fn test_oversized_grid_reports_allocation_failure() {
        let err = Grid::new(Dimension::Three, usize::MAX / 2).unwrap_err();
        assert!(err.is_allocation_error(), "expected Allocation, got {err}");
    }

    #[test]
    fn test_grid_starts_zeroed() {
        let g = Grid::new(Dimension::Three, 3).unwrap();
        assert!(g.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_at_roundtrip() {
        let mut g = Grid::new(Dimension::Two, 4).unwrap();
        *g.at_mut([2, 3, 0]) = 1.5;
        assert_eq!(g.at([2, 3, 0]), 1.5);
        // Distinct coordinates map to distinct cells
        assert_eq!(g.at([3, 2, 0]), 0.0);

        let mut s = SourceField::new(Dimension::Three, 4).unwrap();
        *s.at_mut([1, 1, 1]) = -2.0;
        *s.at_mut([4, 4, 4]) = 7.0;
        assert_eq!(s.at([1, 1, 1]), -2.0);
        assert_eq!(s.at([4, 4, 4]), 7.0);
    }

    #[test]
    fn test_neighbors_2d() {
        let mut g = Grid::new(Dimension::Two, 3).unwrap();
        *g.at_mut([1, 2, 0]) = 1.0; // -i
        *g.at_mut([3, 2, 0]) = 2.0; // +i
        *g.at_mut([2, 1, 0]) = 3.0; // -j
        *g.at_mut([2, 3, 0]) = 4.0; // +j

        let nb = g.neighbors([2, 2, 0]);
        assert_eq!(&nb[..4], &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_neighbors_3d_touch_halo() {
        let mut g = Grid::new(Dimension::Three, 2).unwrap();
        // Halo cell adjacent to the corner interior point
        *g.at_mut([0, 1, 1]) = 9.0;
        let nb = g.neighbors([1, 1, 1]);
        assert_eq!(nb[0], 9.0);
        assert_eq!(nb[1], 0.0);
    }
}
