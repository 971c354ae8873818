pub mod convergence;

pub use convergence::{Convergence, IterationState, SolveStats, SolverState};
