//! Owner-computes decomposition of the global interior points.
//!
//! Interior points are numbered `1..=num_points`; indices `0` and
//! `num_points + 1` are the two global Dirichlet points. Every rank gets a
//! contiguous chunk of `ceil(num_points / P)` points (the last chunk may be
//! shorter), and stores it with one ghost slot on each side.

pub mod topology;
pub use topology::{Topology, TopologyRole};

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// The slice of global interior indices owned by one rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    /// First owned global index (1-based).
    pub start_index: usize,
    /// Last owned global index, inclusive, clamped to `num_points`.
    pub end_index: usize,
    /// Global interior point count.
    pub num_points: usize,
}

impl Partition {
    /// Computes the slice of `rank` out of `size` ranks.
    ///
    /// Rejects `num_points == 0`, `size > num_points` and any chunking that
    /// would leave `rank` without points.
    pub fn new(num_points: usize, rank: usize, size: usize) -> Result<Self> {
        validate(num_points, size)?;
        let chunk = points_per_proc(num_points, size);
        let start_index = rank * chunk + 1;
        let end_index = ((rank + 1) * chunk).min(num_points);
        if start_index > end_index {
            return Err(Error::EmptyPartition { rank, num_points, processes: size });
        }
        Ok(Self { start_index, end_index, num_points })
    }

    pub fn for_topology(num_points: usize, topology: &Topology) -> Result<Self> {
        Self::new(num_points, topology.rank(), topology.size())
    }

    /// Number of owned points.
    pub fn local_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Local storage length along the decomposed dimension, ghosts included.
    pub fn storage_len(&self) -> usize {
        self.local_count() + 2
    }

    pub fn owned(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }

    /// Global index stored at local slot `local` (slot 0 is the lower ghost).
    pub fn global_index(&self, local: usize) -> usize {
        self.start_index + local - 1
    }
}

/// `ceil(num_points / size)`.
pub fn points_per_proc(num_points: usize, size: usize) -> usize {
    num_points.div_ceil(size)
}

/// Up-front configuration check run before any iteration.
pub fn validate(num_points: usize, size: usize) -> Result<()> {
    if num_points == 0 {
        return Err(Error::Config("number of points must be positive".into()));
    }
    if size == 0 {
        return Err(Error::Config("process group is empty".into()));
    }
    if size > num_points {
        return Err(Error::PointCountBelowProcesses { num_points, processes: size });
    }
    // every rank must reach the same verdict, so check the last chunk here
    if (size - 1) * points_per_proc(num_points, size) >= num_points {
        return Err(Error::EmptyPartition { rank: size - 1, num_points, processes: size });
    }
    Ok(())
}

/// Partitions for every rank, in rank order.
pub fn partition_all(num_points: usize, size: usize) -> Result<Vec<Partition>> {
    (0..size).map(|rank| Partition::new(num_points, rank, size)).collect()
}
