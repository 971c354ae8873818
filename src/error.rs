use thiserror::Error;

// Unified error type for jacobi-dd

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid value for {option}: {value}")]
    Parse { option: &'static str, value: String },
    #[error("{num_points} interior points cannot be shared by {processes} processes")]
    PointCountBelowProcesses { num_points: usize, processes: usize },
    #[error("rank {rank} would own no points ({num_points} points over {processes} processes)")]
    EmptyPartition { rank: usize, num_points: usize, processes: usize },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("Jacobi failed to converge after {iterations} iterations (du_max = {global_max_change:e}, tolerance = {tolerance:e})")]
    NotConverged { iterations: usize, global_max_change: f64, tolerance: f64 },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this failure; non-convergence is distinguished
    /// from setup and transport failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotConverged { .. } => 1,
            _ => 2,
        }
    }

    /// Whether every rank of a run reaches this error together.
    ///
    /// Non-convergence and rejected configurations are decided from
    /// reduced or broadcast values, so no rank is left waiting on the one
    /// reporting them. Anything else may strand peers in a receive.
    pub fn is_collective(&self) -> bool {
        matches!(
            self,
            Error::NotConverged { .. }
                | Error::Config(_)
                | Error::PointCountBelowProcesses { .. }
                | Error::EmptyPartition { .. }
        )
    }
}


pub type Result<T> = std::result::Result<T, Error>;
