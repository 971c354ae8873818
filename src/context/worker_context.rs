//! Per-worker solver context.
//!
//! A `WorkerContext` bundles everything one rank owns for the lifetime of a
//! run: its place in the chain, its slice of the grid, the problem it solves
//! and the three state arrays. Nothing in it is shared with other workers.
//!
//! # Usage
//!
//! 1. Build the context from a problem and the rank's [`Topology`].
//! 2. Hand it to [`JacobiSolver::solve`](crate::solver::JacobiSolver::solve).
//! 3. Read the accepted local solution from [`WorkerContext::current`].

use crate::core::field::HaloField;
use crate::core::traits::Problem;
use crate::error::Result;
use crate::parallel::{exchange_halo, Comm};
use crate::partition::{Partition, Topology};
use crate::stencil;

pub struct WorkerContext<P> {
    pub problem: P,
    pub topology: Topology,
    pub partition: Partition,
    /// Iterate being built in the current round.
    current: HaloField,
    /// Iterate of the prior round plus freshly received ghosts.
    previous: HaloField,
    /// Right-hand side, fixed after initialization.
    source: HaloField,
}

impl<P: Problem> WorkerContext<P> {
    /// Partitions the grid for `topology` and initializes source term,
    /// initial guess and owned Dirichlet values.
    pub fn new(problem: P, topology: Topology) -> Result<Self> {
        let partition = Partition::for_topology(problem.num_points(), &topology)?;
        let mut current = HaloField::zeros(partition.local_count(), problem.line_width());
        let mut source = current.clone();
        problem.initialize(&partition, &topology, &mut current, &mut source);
        let previous = current.clone();
        Ok(Self { problem, topology, partition, current, previous, source })
    }

    pub fn current(&self) -> &HaloField { &self.current }
    pub fn previous(&self) -> &HaloField { &self.previous }
    pub fn source(&self) -> &HaloField { &self.source }

    /// `previous <- current` over the whole local array.
    pub fn copy_forward(&mut self) {
        self.previous.copy_from(&self.current);
    }

    /// Refreshes the ghost lines of `previous` from the neighbours.
    pub fn exchange<C: Comm + ?Sized>(&mut self, comm: &C) -> Result<()> {
        exchange_halo(comm, &self.topology, &mut self.previous)
    }

    /// One Jacobi sweep; returns the local max change.
    pub fn relax(&mut self) -> f64 {
        stencil::sweep(
            self.problem.dimension(),
            &self.previous,
            &self.source,
            &mut self.current,
            self.problem.dx(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SerialComm;
    use crate::problem::Poisson1d;

    #[test]
    fn source_is_sampled_at_owned_points() {
        let ctx = WorkerContext::new(Poisson1d::reference(9), Topology::new(1, 3)).unwrap();
        let dx = ctx.problem.dx();
        for l in ctx.source().owned_range() {
            let x = ctx.problem.coordinate(ctx.partition.global_index(l));
            assert_eq!(ctx.source()[(l, 0)], x.exp());
            assert!((x - (l + 3) as f64 * dx).abs() < 1e-15);
        }
        assert_eq!(ctx.previous(), ctx.current());
    }

    #[test]
    fn round_reads_previous_and_writes_current() {
        let mut ctx = WorkerContext::new(Poisson1d::reference(4), Topology::new(0, 1)).unwrap();
        ctx.copy_forward();
        ctx.exchange(&SerialComm).unwrap();
        let du = ctx.relax();
        assert!(du > 0.0);
        let diff = ctx
            .current()
            .owned_values()
            .iter()
            .zip(ctx.previous().owned_values())
            .map(|(u, v)| (u - v).abs())
            .fold(0.0, f64::max);
        assert_eq!(diff, du);
        // ghosts hold the Dirichlet values in both arrays
        assert_eq!(ctx.previous().lower_ghost(), ctx.current().lower_ghost());
        assert_eq!(ctx.previous().upper_ghost(), &[3.0]);
    }
}
