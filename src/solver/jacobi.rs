//! Distributed Jacobi iteration driver.
//!
//! Every round runs, on every worker and in this order: copy-forward, halo
//! exchange, local sweep, global max-reduction. The reduction is the only
//! synchronization point, and nobody starts the next copy-forward before it
//! has the reduced value.

use crate::context::WorkerContext;
use crate::core::traits::Problem;
use crate::error::Result;
use crate::parallel::Comm;
use crate::utils::convergence::{Convergence, IterationState, SolveStats, SolverState};
use tracing::{debug, error, info};

pub const DEFAULT_PRINT_INTERVAL: usize = 1000;

pub struct JacobiSolver {
    pub conv: Convergence<f64>,
    /// Rank 0 reports progress every `print_interval` rounds; 0 disables it.
    pub print_interval: usize,
    pub state: IterationState<f64>,
}

impl JacobiSolver {
    pub fn new(tol: f64, max_iters: usize) -> Self {
        Self {
            conv: Convergence::new(tol, max_iters),
            print_interval: DEFAULT_PRINT_INTERVAL,
            state: IterationState::new(),
        }
    }

    /// Solver with the problem's own tolerance, `0.1 * dx^2`.
    pub fn for_problem<P: Problem>(problem: &P, max_iters: usize) -> Self {
        Self::new(problem.tolerance(), max_iters)
    }

    pub fn with_print_interval(mut self, print_interval: usize) -> Self {
        self.print_interval = print_interval;
        self
    }

    /// Runs one round and returns the collective decision.
    pub fn step<C, P>(&mut self, comm: &C, ctx: &mut WorkerContext<P>) -> Result<SolverState>
    where
        C: Comm + ?Sized,
        P: Problem,
    {
        ctx.copy_forward();
        ctx.exchange(comm)?;
        let du_max_proc = ctx.relax();
        self.conv.coordinate(comm, du_max_proc, &mut self.state)
    }

    /// Iterates until the global max change drops below tolerance or the
    /// iteration cap is reached.
    ///
    /// Returns `Ok` in both cases; `converged` in the stats tells them apart
    /// and is identical on every worker. Errors are transport failures.
    pub fn solve<C, P>(&mut self, comm: &C, ctx: &mut WorkerContext<P>) -> Result<SolveStats<f64>>
    where
        C: Comm + ?Sized,
        P: Problem,
    {
        let root = ctx.topology.is_root();
        let mut state = self.conv.state(&self.state);
        while state == SolverState::Running {
            state = self.step(comm, ctx)?;
            let n = self.state.iteration;
            if root && self.print_interval > 0 && n % self.print_interval == 0 {
                info!("After {} iterations, du_max = {:e}", n, self.state.global_max_change);
            }
        }

        let stats = self.conv.stats(&self.state);
        debug!(
            rank = ctx.topology.rank(),
            iterations = stats.iterations,
            du_max = stats.final_change,
            "worker finished"
        );
        if !stats.converged && root {
            error!("*** Jacobi failed to converge!");
            error!("***   Iterations = {}", stats.iterations);
            error!("***   Reached du_max = {:e}", stats.final_change);
            error!("***   Tolerance = {:e}", stats.tolerance);
        }
        Ok(stats)
    }
}
