//! Core problem traits for jacobi-dd.

use crate::core::field::HaloField;
use crate::partition::{Partition, Topology};

/// Dimensionality of the discretized domain. Selects the stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// `u'' = f` on `[a, b]`, three-point stencil.
    One,
    /// `u_xx + u_yy = f` on `[a, b]^2`, five-point stencil; rows are striped
    /// across ranks, columns are never split.
    Two,
}

/// A Dirichlet Poisson problem discretized with `num_points` interior points
/// per dimension on a uniform grid.
pub trait Problem {
    fn dimension(&self) -> Dimension;

    /// Interior points per dimension.
    fn num_points(&self) -> usize;

    /// Domain bounds `[a, b]`, shared by both dimensions in 2-D.
    fn bounds(&self) -> (f64, f64);

    /// Grid spacing `(b - a) / (num_points + 1)`.
    fn dx(&self) -> f64 {
        let (a, b) = self.bounds();
        (b - a) / (self.num_points() + 1) as f64
    }

    /// Stopping tolerance on the global max change, `0.1 * dx^2`.
    fn tolerance(&self) -> f64 {
        0.1 * self.dx().powi(2)
    }

    /// Coordinate of global grid index `index` (0 and `num_points + 1` are
    /// the boundary points).
    fn coordinate(&self, index: usize) -> f64 {
        self.bounds().0 + index as f64 * self.dx()
    }

    /// Values per line in the undecomposed direction.
    fn line_width(&self) -> usize {
        match self.dimension() {
            Dimension::One => 1,
            Dimension::Two => self.num_points() + 2,
        }
    }

    /// Fills the source term and initial guess of this worker's slice, and
    /// the Dirichlet values it owns (global boundary ghost lines for rank 0
    /// and rank `P-1`, boundary columns in 2-D).
    fn initialize(
        &self,
        partition: &Partition,
        topology: &Topology,
        current: &mut HaloField,
        source: &mut HaloField,
    );
}
