//! Dirichlet Poisson problems solved by the distributed Jacobi driver.

pub mod poisson1d;
pub mod poisson2d;

pub use poisson1d::Poisson1d;
pub use poisson2d::Poisson2d;
