//! SPMD driver: every rank runs `run_worker`.
//!
//! Built with `--features mpi` the ranks are MPI processes
//! (`mpirun -n 4 jacobi --points 100`); otherwise `--ranks P` runs `P` ranks
//! as threads of this process.

use jacobi_dd::config::{read_num_points, SolverOptions, USAGE};
#[cfg(not(feature = "mpi"))]
use jacobi_dd::error::Error;
use jacobi_dd::error::Result;
#[cfg(feature = "mpi")]
use jacobi_dd::parallel::MpiComm;
#[cfg(not(feature = "mpi"))]
use jacobi_dd::parallel::{SerialComm, ThreadUniverse, UniverseComm};
use jacobi_dd::solver::run_worker;
use std::io::Write;
use tracing::error;
#[cfg(feature = "mpi")]
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let code = match run() {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let options = SolverOptions::from_args(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{USAGE}");
        e
    })?;
    launch(&options)
}

#[cfg(feature = "mpi")]
fn launch(options: &SolverOptions) -> Result<()> {
    if options.ranks != 1 {
        warn!("--ranks is ignored under MPI; the process count comes from the launcher");
    }
    let comm = MpiComm::new()?;
    match run_worker(&comm, options, prompt_num_points) {
        Ok(_) => Ok(()),
        Err(e) if e.is_collective() => Err(e),
        Err(e) => {
            // peers may be blocked on this rank; take the whole job down
            error!("{e}");
            comm.abort(e.exit_code())
        }
    }
}

#[cfg(not(feature = "mpi"))]
fn launch(options: &SolverOptions) -> Result<()> {
    if options.ranks == 1 {
        return run_worker(&UniverseComm::Serial(SerialComm), options, prompt_num_points).map(|_| ());
    }
    let comms = ThreadUniverse::new(options.ranks)?;
    let results: Vec<Result<()>> = std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                s.spawn(move || {
                    run_worker(&UniverseComm::Thread(comm), options, prompt_num_points).map(|_| ())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(Error::Transport("a rank panicked".into()))))
            .collect()
    });
    // the first failing rank carries the root cause; later ones see its hang-up
    results.into_iter().find(|r| r.is_err()).unwrap_or(Ok(()))
}

fn prompt_num_points() -> Result<usize> {
    println!("How many points to use?");
    std::io::stdout().flush()?;
    read_num_points(std::io::stdin().lock())
}
