//! Ghost-line exchange between chain neighbours.
//!
//! Each worker sends its first owned line left (tag [`LEFTWARD`]) and its
//! last owned line right (tag [`RIGHTWARD`]), then receives the right
//! neighbour's leftward line into its upper ghost and the left neighbour's
//! rightward line into its lower ghost. Edges of the chain skip the missing
//! side. Sends are posted before any receive blocks, so the chain cannot
//! deadlock.

use super::{Comm, HaloLink, LEFTWARD, RIGHTWARD};
use crate::core::field::{HaloField, HaloView};
use crate::error::Result;
use crate::partition::Topology;

/// Refreshes the ghost lines of `field` from the neighbours of `topology`.
///
/// The send lines are borrowed from `field` for the whole call and the
/// backend waits on them before returning, so the next copy-forward can
/// safely overwrite them.
pub fn exchange_halo<C: Comm + ?Sized>(comm: &C, topology: &Topology, field: &mut HaloField) -> Result<()> {
    if !topology.has_left_neighbor() && !topology.has_right_neighbor() {
        return Ok(());
    }
    let HaloView { lower_ghost, first_owned, last_owned, upper_ghost } = field.halo_view();
    let mut links = Vec::with_capacity(2);
    if let Some(left) = topology.left() {
        links.push(HaloLink {
            peer: left,
            send: first_owned,
            send_tag: LEFTWARD,
            recv: lower_ghost,
            recv_tag: RIGHTWARD,
        });
    }
    if let Some(right) = topology.right() {
        links.push(HaloLink {
            peer: right,
            send: last_owned,
            send_tag: RIGHTWARD,
            recv: upper_ghost,
            recv_tag: LEFTWARD,
        });
    }
    comm.exchange(&mut links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::{SerialComm, ThreadUniverse};
    use std::thread;

    #[test]
    fn single_process_exchange_is_noop() {
        let mut f = HaloField::zeros(2, 1);
        f.lower_ghost_mut()[0] = 7.0;
        f.upper_ghost_mut()[0] = 8.0;
        let before = f.clone();
        exchange_halo(&SerialComm, &Topology::new(0, 1), &mut f).unwrap();
        assert_eq!(f, before);
    }

    #[test]
    fn chain_of_three_exchanges_boundary_lines() {
        let comms = ThreadUniverse::new(3).unwrap();
        let fields: Vec<HaloField> = thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        let topo = comm.topology();
                        let mut f = HaloField::zeros(2, 2);
                        let base = 10.0 * topo.rank() as f64;
                        f.line_mut(1).copy_from_slice(&[base + 1.0, base + 1.5]);
                        f.line_mut(2).copy_from_slice(&[base + 2.0, base + 2.5]);
                        f.lower_ghost_mut().fill(-1.0);
                        f.upper_ghost_mut().fill(-1.0);
                        exchange_halo(&comm, &topo, &mut f).unwrap();
                        f
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        // rank 0 keeps its lower ghost, receives rank 1's first line
        assert_eq!(fields[0].lower_ghost(), &[-1.0, -1.0]);
        assert_eq!(fields[0].upper_ghost(), &[11.0, 11.5]);
        // rank 1 sees rank 0's last line and rank 2's first line
        assert_eq!(fields[1].lower_ghost(), &[2.0, 2.5]);
        assert_eq!(fields[1].upper_ghost(), &[21.0, 21.5]);
        assert_eq!(fields[2].lower_ghost(), &[12.0, 12.5]);
        assert_eq!(fields[2].upper_ghost(), &[-1.0, -1.0]);
        // owned lines untouched
        assert_eq!(fields[1].first_owned(), &[11.0, 11.5]);
    }
}
