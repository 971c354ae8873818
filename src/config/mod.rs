pub mod options;

pub use options::{read_num_points, SolverOptions, USAGE};
