//! jacobi-dd: domain-decomposed Jacobi relaxation for the Poisson equation
//!
//! The grid is striped across a chain of ranks. Each round, every rank copies
//! its iterate forward, exchanges one ghost line with each neighbour, runs a
//! Jacobi sweep over the points it owns, and joins a global max-reduction of
//! the change that decides, identically everywhere, whether to stop. The same
//! driver serves the 1-D three-point and the 2-D five-point stencil, over MPI
//! or over in-process ranks.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod output;
pub mod partition;
pub mod problem;
pub mod solver;
pub mod stencil;
pub mod utils;

// Re-exports for convenience
pub use crate::config::*;
pub use crate::context::*;
pub use crate::core::*;
pub use crate::error::*;
pub use crate::partition::*;
pub use crate::problem::*;
pub use crate::solver::*;
pub use crate::utils::*;

pub use output::{OutputMode, OutputTarget};
pub use parallel::{Comm, SerialComm, ThreadComm, ThreadUniverse, UniverseComm};
