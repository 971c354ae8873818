//! Context module for jacobi-dd.
//!
//! A context owns the per-worker state the iteration driver mutates, so the
//! driver itself holds no globals and can be exercised against any
//! communicator.
//!
//! Modules:
//! - [`worker_context`]: the `WorkerContext` struct holding topology,
//!   partition and state arrays of one rank.

pub mod worker_context;
pub use worker_context::WorkerContext;
