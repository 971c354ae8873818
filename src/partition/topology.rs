//! Linear-chain process topology.
//!
//! Ranks `0..P-1` form a chain. The only thing the solver needs from a rank
//! number is its role in that chain: whether it has neighbours to exchange
//! halos with, and whether it holds one of the two global Dirichlet
//! boundaries. Those roles are exposed as a [`TopologyRole`] set.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TopologyRole: u8 {
        const HAS_LEFT_NEIGHBOR    = 0b0001;
        const HAS_RIGHT_NEIGHBOR   = 0b0010;
        const OWNS_LEFT_BOUNDARY   = 0b0100; // rank 0: u(a) / bottom row
        const OWNS_RIGHT_BOUNDARY  = 0b1000; // rank P-1: u(b) / top row
        const INTERIOR             = Self::HAS_LEFT_NEIGHBOR.bits() | Self::HAS_RIGHT_NEIGHBOR.bits();
        const SOLE                 = Self::OWNS_LEFT_BOUNDARY.bits() | Self::OWNS_RIGHT_BOUNDARY.bits();
    }
}

/// Position of one worker in the chain. Immutable for the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    rank: usize,
    size: usize,
    role: TopologyRole,
}

impl Topology {
    pub fn new(rank: usize, size: usize) -> Self {
        assert!(size > 0 && rank < size, "rank {rank} outside communicator of size {size}");
        let mut role = TopologyRole::empty();
        if rank > 0 {
            role |= TopologyRole::HAS_LEFT_NEIGHBOR;
        } else {
            role |= TopologyRole::OWNS_LEFT_BOUNDARY;
        }
        if rank + 1 < size {
            role |= TopologyRole::HAS_RIGHT_NEIGHBOR;
        } else {
            role |= TopologyRole::OWNS_RIGHT_BOUNDARY;
        }
        Self { rank, size, role }
    }

    pub fn rank(&self) -> usize { self.rank }
    pub fn size(&self) -> usize { self.size }
    pub fn role(&self) -> TopologyRole { self.role }

    pub fn has_left_neighbor(&self) -> bool { self.role.contains(TopologyRole::HAS_LEFT_NEIGHBOR) }
    pub fn has_right_neighbor(&self) -> bool { self.role.contains(TopologyRole::HAS_RIGHT_NEIGHBOR) }
    pub fn owns_left_boundary(&self) -> bool { self.role.contains(TopologyRole::OWNS_LEFT_BOUNDARY) }
    pub fn owns_right_boundary(&self) -> bool { self.role.contains(TopologyRole::OWNS_RIGHT_BOUNDARY) }

    /// Rank of the lower neighbour, if any.
    pub fn left(&self) -> Option<usize> {
        self.has_left_neighbor().then(|| self.rank - 1)
    }

    /// Rank of the upper neighbour, if any.
    pub fn right(&self) -> Option<usize> {
        self.has_right_neighbor().then(|| self.rank + 1)
    }

    /// Designated rank for input, progress reports and failure diagnostics.
    pub fn is_root(&self) -> bool { self.rank == 0 }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}/{} ({:?})", self.rank, self.size, self.role)
    }
}
