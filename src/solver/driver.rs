//! Per-rank program: agree on the problem size, solve, write.
//!
//! Every rank of a run calls [`run_worker`] with its own communicator. Rank 0
//! alone obtains the point count and broadcasts it; every rank then runs the
//! same validation, so a bad configuration is rejected with the same error
//! everywhere before any neighbour traffic starts.

use crate::config::SolverOptions;
use crate::context::WorkerContext;
use crate::core::traits::{Dimension, Problem};
use crate::error::Result;
use crate::output;
use crate::parallel::Comm;
use crate::partition::{self, Topology};
use crate::problem::{Poisson1d, Poisson2d};
use crate::solver::jacobi::JacobiSolver;
use std::path::PathBuf;
use tracing::{error, info};

/// Runs one rank to completion and returns the file it wrote.
///
/// `read_points` is consulted on rank 0 only, and only when the options
/// leave the point count unset. A failed read is broadcast as 0, which every
/// rank then rejects as a configuration error.
pub fn run_worker<C, F>(comm: &C, options: &SolverOptions, read_points: F) -> Result<PathBuf>
where
    C: Comm + ?Sized,
    F: FnOnce() -> Result<usize>,
{
    let topology = comm.topology();

    let mut num_points = 0u64;
    if topology.is_root() {
        num_points = match options.num_points {
            Some(n) => n as u64,
            None => read_points().unwrap_or_else(|e| {
                error!("{e}");
                0
            }) as u64,
        };
    }
    comm.broadcast(&mut num_points, 0)?;
    let num_points = num_points as usize;
    partition::validate(num_points, topology.size())?;

    match options.dimension {
        Dimension::One => solve_and_write(comm, topology, Poisson1d::reference(num_points), options),
        Dimension::Two => solve_and_write(comm, topology, Poisson2d::reference(num_points), options),
    }
}

fn solve_and_write<C, P>(comm: &C, topology: Topology, problem: P, options: &SolverOptions) -> Result<PathBuf>
where
    C: Comm + ?Sized,
    P: Problem,
{
    if topology.is_root() {
        info!(
            "Points per proc = {}",
            partition::points_per_proc(problem.num_points(), topology.size())
        );
    }
    let mut ctx = WorkerContext::new(problem, topology)?;
    info!("Rank {} - ({}, {})", topology.rank(), ctx.partition.start_index, ctx.partition.end_index);

    let mut solver = JacobiSolver::for_problem(&ctx.problem, options.max_iterations())
        .with_print_interval(options.print_interval);
    let stats = solver.solve(comm, &mut ctx)?;
    info!(
        "Rank {} finished after {} iterations, du_max = {:e}",
        topology.rank(),
        stats.iterations,
        stats.final_change
    );
    stats.into_result()?;

    comm.barrier()?;
    output::write_solution(comm, &options.output, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::output::OutputMode;
    use crate::parallel::{ThreadComm, ThreadUniverse};
    use std::thread;

    fn run<T: Send>(size: usize, f: impl Fn(ThreadComm) -> T + Sync) -> Vec<T> {
        let comms = ThreadUniverse::new(size).unwrap();
        thread::scope(|s| {
            let handles: Vec<_> = comms.into_iter().map(|c| s.spawn(|| f(c))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    fn unreachable_reader() -> Result<usize> {
        panic!("the point count was given in the options")
    }

    #[test]
    fn fewer_points_than_ranks_fails_on_every_rank() {
        let options = SolverOptions { num_points: Some(2), ..SolverOptions::default() };
        let out = run(4, |c| run_worker(&c, &options, unreachable_reader));
        assert_eq!(out.len(), 4);
        for r in out {
            assert!(matches!(
                r,
                Err(Error::PointCountBelowProcesses { num_points: 2, processes: 4 })
            ));
        }
    }

    #[test]
    fn root_count_reaches_every_rank() {
        // only rank 0 reads; the others learn the count from the broadcast
        let out = run(3, |c| {
            let reader = || {
                assert_eq!(c.rank(), 0);
                Ok(2)
            };
            run_worker(&c, &SolverOptions::default(), reader)
        });
        for r in out {
            assert!(matches!(
                r,
                Err(Error::PointCountBelowProcesses { num_points: 2, processes: 3 })
            ));
        }
    }

    #[test]
    fn failed_read_is_rejected_everywhere() {
        let out = run(3, |c| {
            run_worker(&c, &SolverOptions::default(), || Err(Error::Config("stdin closed".into())))
        });
        for r in out {
            assert!(matches!(r, Err(Error::Config(_))));
        }
    }

    #[test]
    fn non_convergence_is_reported_by_every_rank() {
        let options = SolverOptions {
            num_points: Some(9),
            max_iterations: Some(1),
            print_interval: 0,
            ..SolverOptions::default()
        };
        let out = run(3, |c| run_worker(&c, &options, unreachable_reader));
        for r in out {
            let err = r.unwrap_err();
            assert!(matches!(err, Error::NotConverged { iterations: 1, .. }));
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn converged_run_writes_one_file_per_rank() {
        let dir = std::env::temp_dir().join(format!("jacobi-dd-driver-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut options = SolverOptions { num_points: Some(9), print_interval: 0, ..SolverOptions::default() };
        options.output.dir = dir.clone();
        options.output.mode = OutputMode::PerRank;
        let out = run(3, |c| run_worker(&c, &options, unreachable_reader).unwrap());
        for (rank, path) in out.iter().enumerate() {
            assert_eq!(*path, dir.join(format!("jacobi_{rank}.txt")));
            assert!(path.exists());
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
