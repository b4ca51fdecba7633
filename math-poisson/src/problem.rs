//! Manufactured test problems with known exact solutions.
//!
//! The reference problem solves `-Δu = f` on the unit square/cube with
//! homogeneous Dirichlet boundaries, using the manufactured solution
//! `u = sin(πx) sin(πy) [sin(πz)]`, for which `f = d π² u`.

use std::f64::consts::PI;

use crate::error::{Result, SolverError};
use crate::grid::{Dimension, Grid, SourceField};

/// A grid, its source term, and the exact solution sampled on the same
/// halo layout.
#[derive(Debug, Clone)]
pub struct ManufacturedProblem {
    /// Zero-initialized solution field (the initial guess)
    pub field: Grid,
    /// Source term `f = d π² u`
    pub source: SourceField,
    /// Exact solution, zero on the halo
    pub exact: Grid,
}

/// Build the manufactured sine problem for an `n^d` interior with mesh
/// spacing `h`.
pub fn manufactured_problem(dim: Dimension, n: usize, h: f64) -> Result<ManufacturedProblem> {
    if !h.is_finite() || h <= 0.0 {
        return Err(SolverError::InvalidSpacing { h });
    }

    let field = Grid::new(dim, n)?;
    let mut exact = Grid::new(dim, n)?;
    let mut source = SourceField::new(dim, n)?;
    let coef = dim.ndim() as f64 * PI * PI;

    for i in 1..=n {
        let sx = (PI * i as f64 * h).sin();
        for j in 1..=n {
            let sy = (PI * j as f64 * h).sin();
            match dim {
                Dimension::Two => {
                    let u = sx * sy;
                    *exact.at_mut([i, j, 0]) = u;
                    *source.at_mut([i, j, 0]) = coef * u;
                }
                Dimension::Three => {
                    for k in 1..=n {
                        let u = sx * sy * (PI * k as f64 * h).sin();
                        *exact.at_mut([i, j, k]) = u;
                        *source.at_mut([i, j, k]) = coef * u;
                    }
                }
            }
        }
    }

    Ok(ManufacturedProblem {
        field,
        source,
        exact,
    })
}

/// Relative L2 error of `field` against `exact` over the interior.
pub fn relative_l2_error(field: &Grid, exact: &Grid) -> f64 {
    let n = field.n();
    let mut error_sq = 0.0;
    let mut norm_sq = 0.0;

    let mut accumulate = |c: [usize; 3]| {
        let diff = field.at(c) - exact.at(c);
        error_sq += diff * diff;
        norm_sq += exact.at(c) * exact.at(c);
    };

    for i in 1..=n {
        for j in 1..=n {
            match field.dim() {
                Dimension::Two => accumulate([i, j, 0]),
                Dimension::Three => {
                    for k in 1..=n {
                        accumulate([i, j, k]);
                    }
                }
            }
        }
    }

    if norm_sq > 1e-15 {
        (error_sq / norm_sq).sqrt()
    } else {
        error_sq.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_source_is_d_pi_squared_u() {
        let n = 9;
        let h = 0.1;
        let p = manufactured_problem(Dimension::Two, n, h).unwrap();
        for i in 1..=n {
            for j in 1..=n {
                assert_relative_eq!(
                    p.source.at([i, j, 0]),
                    2.0 * PI * PI * p.exact.at([i, j, 0]),
                    max_relative = 1e-14
                );
            }
        }

        let p = manufactured_problem(Dimension::Three, 4, 0.2).unwrap();
        assert_relative_eq!(
            p.source.at([2, 3, 1]),
            3.0 * PI * PI * p.exact.at([2, 3, 1]),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_exact_solution_vanishes_on_unit_boundary() {
        // With h = 1/(n+1) the sampled sine hits the domain boundary at
        // the halo, which stays zero by construction.
        let n = 7;
        let h = 1.0 / (n as f64 + 1.0);
        let p = manufactured_problem(Dimension::Two, n, h).unwrap();
        for j in 0..p.exact.side() {
            assert_eq!(p.exact.at([0, j, 0]), 0.0);
            assert_eq!(p.exact.at([n + 1, j, 0]), 0.0);
        }
    }

    #[test]
    fn test_initial_field_is_zero() {
        let p = manufactured_problem(Dimension::Three, 5, 0.125).unwrap();
        assert!(p.field.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_relative_error_of_exact_is_zero() {
        let p = manufactured_problem(Dimension::Two, 6, 0.1).unwrap();
        assert_eq!(relative_l2_error(&p.exact, &p.exact), 0.0);
    }

    #[test]
    fn test_invalid_spacing_rejected() {
        assert!(manufactured_problem(Dimension::Two, 4, -1.0).is_err());
        assert!(manufactured_problem(Dimension::Two, 4, f64::INFINITY).is_err());
    }
}
