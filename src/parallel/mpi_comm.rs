//! MPI-based communication backend.
//!
//! This module implements the `Comm` trait on top of the MPI world
//! communicator for distributed-memory runs, one process per rank. It is only
//! available with the `mpi` feature.
//!
//! # Halo exchange
//!
//! Sends are posted with `immediate_send_with_tag` inside an
//! `mpi::request::scope`, receives block with `receive_into_with_tag`, and
//! every send request is waited on before the scope closes. The borrow of the
//! send lines therefore outlives the transfer, and the next round's
//! copy-forward cannot race an in-flight send.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")] {
//! use jacobi_dd::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().unwrap();
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier().unwrap();
//! # }
//! ```

use super::{Comm, HaloLink, Tag};
use crate::error::{Error, Result};
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

/// MPI communicator wrapper.
///
/// Owns the MPI universe, so MPI is finalized when the communicator is
/// dropped and not before.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    /// The rank of this process within the communicator.
    pub rank: usize,
    /// The total number of processes in the communicator.
    pub size: usize,
    _universe: Universe,
}

impl MpiComm {
    /// Initializes MPI and wraps the world communicator.
    pub fn new() -> Result<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| Error::Transport("MPI was already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }

    /// Terminates every process of the job with `code`.
    ///
    /// For failures only this rank sees: its peers could otherwise block
    /// forever on a message that will never be sent.
    pub fn abort(&self, code: i32) -> ! {
        self.world.abort(code)
    }
}

impl Comm for MpiComm {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }
    fn barrier(&self) -> Result<()> {
        self.world.barrier();
        Ok(())
    }

    fn broadcast(&self, value: &mut u64, root: usize) -> Result<()> {
        self.world.process_at_rank(root as i32).broadcast_into(value);
        Ok(())
    }

    fn all_reduce_max(&self, x: f64) -> Result<f64> {
        let mut y = x;
        self.world.all_reduce_into(&x, &mut y, SystemOperation::max());
        Ok(y)
    }

    fn exchange(&self, links: &mut [HaloLink<'_>]) -> Result<()> {
        let world = &self.world;
        mpi::request::scope(|scope| {
            let sends: Vec<_> = links
                .iter()
                .map(|link| {
                    world
                        .process_at_rank(link.peer as i32)
                        .immediate_send_with_tag(scope, link.send, link.send_tag)
                })
                .collect();
            for link in links.iter_mut() {
                world
                    .process_at_rank(link.peer as i32)
                    .receive_into_with_tag(&mut *link.recv, link.recv_tag);
            }
            for request in sends {
                request.wait_without_status();
            }
        });
        Ok(())
    }

    fn send_token(&self, dest: usize, tag: Tag) -> Result<()> {
        let token: [u8; 0] = [];
        self.world.process_at_rank(dest as i32).send_with_tag(&token[..], tag);
        Ok(())
    }

    fn recv_token(&self, source: usize, tag: Tag) -> Result<()> {
        let (_token, _status) = self.world.process_at_rank(source as i32).receive_vec_with_tag::<u8>(tag);
        Ok(())
    }
}
