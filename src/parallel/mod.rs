//! Message-passing substrate for the SPMD solver.
//!
//! Workers share no memory; everything that crosses a worker boundary goes
//! through a [`Comm`]. Three backends exist:
//!
//! - [`SerialComm`]: a single rank; exchanges are no-ops, reductions identity.
//! - [`ThreadComm`]: `P` ranks inside one process, one OS thread each.
//! - `MpiComm` (feature `mpi`): the MPI world communicator.
//!
//! [`UniverseComm`] dispatches over whichever backends are compiled in.

pub mod halo;
pub use halo::exchange_halo;

pub mod thread_comm;
pub use thread_comm::{ThreadComm, ThreadUniverse};

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;

use crate::error::Result;
use crate::partition::Topology;

/// Message tag.
pub type Tag = i32;

/// Boundary line travelling to the lower-ranked neighbour.
pub const LEFTWARD: Tag = 1;
/// Boundary line travelling to the higher-ranked neighbour.
pub const RIGHTWARD: Tag = 2;
/// Go-ahead token for ordered output.
pub const OUTPUT_TOKEN: Tag = 4;

/// One neighbour's half of a halo exchange: `send` goes out to `peer` with
/// `send_tag`, and `peer`'s line tagged `recv_tag` lands in `recv`.
pub struct HaloLink<'a> {
    pub peer: usize,
    pub send: &'a [f64],
    pub send_tag: Tag,
    pub recv: &'a mut [f64],
    pub recv_tag: Tag,
}

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    /// Blocks until every rank has arrived.
    fn barrier(&self) -> Result<()>;

    /// Replaces `value` on every rank with `root`'s value.
    fn broadcast(&self, value: &mut u64, root: usize) -> Result<()>;

    /// Maximum of `x` over all ranks, identical on every rank.
    fn all_reduce_max(&self, x: f64) -> Result<f64>;

    /// Posts every send without blocking, then blocks on every receive, then
    /// waits for every send to complete. On return no send buffer is still
    /// in flight.
    fn exchange(&self, links: &mut [HaloLink<'_>]) -> Result<()>;

    /// Zero-length message used to sequence ranks.
    fn send_token(&self, dest: usize, tag: Tag) -> Result<()>;
    fn recv_token(&self, source: usize, tag: Tag) -> Result<()>;

    fn topology(&self) -> Topology {
        Topology::new(self.rank(), self.size())
    }
}

/// Communicator of a one-rank run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> usize { 0 }
    fn size(&self) -> usize { 1 }
    fn barrier(&self) -> Result<()> { Ok(()) }
    fn broadcast(&self, _value: &mut u64, _root: usize) -> Result<()> { Ok(()) }
    fn all_reduce_max(&self, x: f64) -> Result<f64> { Ok(x) }
    fn exchange(&self, links: &mut [HaloLink<'_>]) -> Result<()> {
        // a single rank has no neighbours to link to
        debug_assert!(links.is_empty());
        Ok(())
    }
    fn send_token(&self, _dest: usize, _tag: Tag) -> Result<()> { Ok(()) }
    fn recv_token(&self, _source: usize, _tag: Tag) -> Result<()> { Ok(()) }
}

pub enum UniverseComm {
    Serial(SerialComm),
    Thread(ThreadComm),
    #[cfg(feature = "mpi")]
    Mpi(MpiComm),
}

impl Comm for UniverseComm {
    fn rank(&self) -> usize {
        match self {
            UniverseComm::Serial(comm) => comm.rank(),
            UniverseComm::Thread(comm) => comm.rank(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.rank(),
        }
    }
    fn size(&self) -> usize {
        match self {
            UniverseComm::Serial(comm) => comm.size(),
            UniverseComm::Thread(comm) => comm.size(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.size(),
        }
    }
    fn barrier(&self) -> Result<()> {
        match self {
            UniverseComm::Serial(comm) => comm.barrier(),
            UniverseComm::Thread(comm) => comm.barrier(),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.barrier(),
        }
    }
    fn broadcast(&self, value: &mut u64, root: usize) -> Result<()> {
        match self {
            UniverseComm::Serial(comm) => comm.broadcast(value, root),
            UniverseComm::Thread(comm) => comm.broadcast(value, root),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.broadcast(value, root),
        }
    }
    fn all_reduce_max(&self, x: f64) -> Result<f64> {
        match self {
            UniverseComm::Serial(comm) => comm.all_reduce_max(x),
            UniverseComm::Thread(comm) => comm.all_reduce_max(x),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.all_reduce_max(x),
        }
    }
    fn exchange(&self, links: &mut [HaloLink<'_>]) -> Result<()> {
        match self {
            UniverseComm::Serial(comm) => comm.exchange(links),
            UniverseComm::Thread(comm) => comm.exchange(links),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.exchange(links),
        }
    }
    fn send_token(&self, dest: usize, tag: Tag) -> Result<()> {
        match self {
            UniverseComm::Serial(comm) => comm.send_token(dest, tag),
            UniverseComm::Thread(comm) => comm.send_token(dest, tag),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.send_token(dest, tag),
        }
    }
    fn recv_token(&self, source: usize, tag: Tag) -> Result<()> {
        match self {
            UniverseComm::Serial(comm) => comm.recv_token(source, tag),
            UniverseComm::Thread(comm) => comm.recv_token(source, tag),
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.recv_token(source, tag),
        }
    }
}
