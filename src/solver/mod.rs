//! Iteration drivers.

pub mod driver;
pub mod jacobi;
pub use driver::run_worker;
pub use jacobi::{JacobiSolver, DEFAULT_PRINT_INTERVAL};
