//! Error types for the Poisson solver.
//!
//! All failures are either input-validation rejections, checked at solve
//! entry before any allocation, or allocation rejections. Neither is
//! retried. Failure to converge is not an error; see
//! [`Solution`](crate::solver::Solution).

use thiserror::Error;

/// Errors that can occur when setting up or running a solve.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Grid size must be at least one interior point per axis.
    #[error("grid size ({n}) must be >= 1")]
    InvalidSize {
        /// The rejected interior size
        n: usize,
    },

    /// Mesh spacing must be a finite positive number.
    #[error("mesh spacing ({h}) must be finite and > 0")]
    InvalidSpacing {
        /// The rejected spacing
        h: f64,
    },

    /// Worker count must be at least one.
    #[error("thread count ({threads}) must be >= 1")]
    InvalidThreadCount {
        /// The rejected thread count
        threads: usize,
    },

    /// The lexicographic sweep updates every point from its already-updated
    /// predecessors and cannot be split across workers.
    #[error("lexicographic ordering is inherently sequential (got {threads} threads)")]
    SequentialOrdering {
        /// The rejected thread count
        threads: usize,
    },

    /// Field and source term describe different index spaces.
    #[error(
        "grid/source shape mismatch: grid is {grid_n}^{grid_dim}, source is {source_n}^{source_dim}"
    )]
    ShapeMismatch {
        /// Grid dimensionality
        grid_dim: usize,
        /// Grid interior size per axis
        grid_n: usize,
        /// Source dimensionality
        source_dim: usize,
        /// Source size per axis
        source_n: usize,
    },

    /// A field buffer could not be allocated. Large 3D grids hit this
    /// first: a 512^3 field alone is roughly 1 GiB.
    #[error("failed to allocate {bytes} bytes for a {n}^{dim} field")]
    Allocation {
        /// Requested size in bytes
        bytes: usize,
        /// Interior size per axis
        n: usize,
        /// Dimensionality
        dim: usize,
    },
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    /// Returns `true` if this error was raised by input validation.
    pub fn is_argument_error(&self) -> bool {
        !matches!(self, SolverError::Allocation { .. })
    }

    /// Returns `true` if this error was raised by a failed allocation.
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, SolverError::Allocation { .. })
    }
}
