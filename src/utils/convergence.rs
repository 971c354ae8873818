//! Convergence tracking & the global stop decision.
//!
//! The stop decision is taken independently on every worker from the
//! max-reduced change; nothing else is broadcast. Identical inputs give an
//! identical decision everywhere, and the reduction doubles as the round's
//! synchronization point.

use crate::error::{Error, Result};
use crate::parallel::Comm;
use num_traits::Float;

/// Stopping criteria.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

/// Driver state after a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    Running,
    Converged,
    DidNotConverge,
}

/// Per-worker iteration counters, threaded through the driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationState<T> {
    /// Completed rounds `N`.
    pub iteration: usize,
    pub local_max_change: T,
    pub global_max_change: T,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_change: T,
    pub tolerance: T,
    pub converged: bool,
}

impl<T: Float> IterationState<T> {
    /// Before the first round the global change is unbounded.
    pub fn new() -> Self {
        Self { iteration: 0, local_max_change: T::zero(), global_max_change: T::infinity() }
    }

    /// Records a completed round.
    pub fn record_round(&mut self, local_max_change: T, global_max_change: T) {
        self.local_max_change = local_max_change;
        self.global_max_change = global_max_change;
        self.iteration += 1;
    }
}

impl<T: Float> Default for IterationState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Convergence<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { tol, max_iters }
    }

    /// `global < tol` wins over the iteration cap, so a round that converges
    /// exactly at the cap still counts as converged. NaN never converges.
    pub fn state(&self, s: &IterationState<T>) -> SolverState {
        if s.global_max_change < self.tol {
            SolverState::Converged
        } else if s.iteration >= self.max_iters {
            SolverState::DidNotConverge
        } else {
            SolverState::Running
        }
    }

    pub fn stats(&self, s: &IterationState<T>) -> SolveStats<T> {
        SolveStats {
            iterations: s.iteration,
            final_change: s.global_max_change,
            tolerance: self.tol,
            converged: self.state(s) == SolverState::Converged,
        }
    }
}

impl Convergence<f64> {
    /// Reduces `local_max_change` over all workers, records the round in
    /// `state` and returns the collective decision.
    pub fn coordinate<C: Comm + ?Sized>(
        &self,
        comm: &C,
        local_max_change: f64,
        state: &mut IterationState<f64>,
    ) -> Result<SolverState> {
        let global = comm.all_reduce_max(local_max_change)?;
        state.record_round(local_max_change, global);
        Ok(self.state(state))
    }
}

impl SolveStats<f64> {
    /// Maps a non-converged outcome to [`Error::NotConverged`].
    pub fn into_result(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NotConverged {
                iterations: self.iterations,
                global_max_change: self.final_change,
                tolerance: self.tolerance,
            })
        }
    }
}
