// in-process ranks connected by channels

use super::{Comm, HaloLink, Tag, LEFTWARD, OUTPUT_TOKEN, RIGHTWARD};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use tracing::{trace, warn};

const TAGS: [Tag; 3] = [LEFTWARD, RIGHTWARD, OUTPUT_TOKEN];

#[derive(Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

/// Reusable barrier that fails instead of blocking once a rank has left.
///
/// A rank that drops its communicator, by returning or by panicking, breaks
/// the barrier: waits of a completed generation still succeed, every other
/// wait returns an error.
struct RankBarrier {
    size: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl RankBarrier {
    fn new(size: usize) -> Self {
        Self { size, state: Mutex::new(BarrierState::default()), released: Condvar::new() }
    }

    fn wait(&self) -> Result<()> {
        let mut state = self.state.lock().map_err(poisoned)?;
        if state.broken {
            return Err(departed());
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return Ok(());
        }
        while state.generation == generation && !state.broken {
            state = self.released.wait(state).map_err(poisoned)?;
        }
        if state.generation != generation { Ok(()) } else { Err(departed()) }
    }

    fn break_all(&self) {
        // a poisoned lock still guards plain counters
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.broken = true;
        self.released.notify_all();
    }
}

/// State shared by all ranks of one universe, used only by collectives.
struct Collective {
    barrier: RankBarrier,
    slots: Mutex<Vec<f64>>,
    broadcast: Mutex<u64>,
}

/// Builds the communicators of an in-process universe.
pub struct ThreadUniverse;

impl ThreadUniverse {
    /// One communicator per rank, to be moved onto one thread each. Every
    /// ordered pair of ranks gets one unbounded channel per tag, so sends
    /// never block and messages with different tags never mix.
    pub fn new(size: usize) -> Result<Vec<ThreadComm>> {
        if size == 0 {
            return Err(Error::Config("a universe needs at least one rank".into()));
        }
        let collective = Arc::new(Collective {
            barrier: RankBarrier::new(size),
            slots: Mutex::new(vec![0.0; size]),
            broadcast: Mutex::new(0),
        });
        let mut comms: Vec<ThreadComm> = (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                collective: Arc::clone(&collective),
                outboxes: HashMap::new(),
                inboxes: HashMap::new(),
            })
            .collect();
        for src in 0..size {
            for dst in (0..size).filter(|&d| d != src) {
                for tag in TAGS {
                    let (tx, rx) = mpsc::channel();
                    comms[src].outboxes.insert((dst, tag), tx);
                    comms[dst].inboxes.insert((src, tag), rx);
                }
            }
        }
        Ok(comms)
    }
}

pub struct ThreadComm {
    rank: usize,
    size: usize,
    collective: Arc<Collective>,
    outboxes: HashMap<(usize, Tag), Sender<Vec<f64>>>,
    inboxes: HashMap<(usize, Tag), Receiver<Vec<f64>>>,
}

impl ThreadComm {
    fn post(&self, dest: usize, tag: Tag, payload: Vec<f64>) -> Result<()> {
        let tx = self
            .outboxes
            .get(&(dest, tag))
            .ok_or_else(|| Error::Transport(format!("rank {} has no route to {dest} (tag {tag})", self.rank)))?;
        tx.send(payload)
            .map_err(|_| Error::Transport(format!("rank {dest} hung up (tag {tag})")))
    }

    fn take(&self, source: usize, tag: Tag) -> Result<Vec<f64>> {
        let rx = self
            .inboxes
            .get(&(source, tag))
            .ok_or_else(|| Error::Transport(format!("rank {} has no route from {source} (tag {tag})", self.rank)))?;
        rx.recv()
            .map_err(|_| Error::Transport(format!("rank {source} hung up before sending (tag {tag})")))
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Transport("a rank panicked inside a collective".into())
}

fn departed() -> Error {
    Error::Transport("a rank left before joining the collective".into())
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(rank = self.rank, "rank panicked; releasing its peers");
        }
        self.collective.barrier.break_all();
    }
}

impl Comm for ThreadComm {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }
    fn barrier(&self) -> Result<()> { self.collective.barrier.wait() }

    fn broadcast(&self, value: &mut u64, root: usize) -> Result<()> {
        if self.rank == root {
            *self.collective.broadcast.lock().map_err(poisoned)? = *value;
        }
        self.collective.barrier.wait()?;
        if self.rank != root {
            *value = *self.collective.broadcast.lock().map_err(poisoned)?;
        }
        self.collective.barrier.wait()?;
        Ok(())
    }

    fn all_reduce_max(&self, x: f64) -> Result<f64> {
        self.collective.slots.lock().map_err(poisoned)?[self.rank] = x;
        self.collective.barrier.wait()?;
        let global = self
            .collective
            .slots
            .lock()
            .map_err(poisoned)?
            .iter()
            .fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        // keep slots stable until every rank has read them
        self.collective.barrier.wait()?;
        Ok(global)
    }

    fn exchange(&self, links: &mut [HaloLink<'_>]) -> Result<()> {
        // the payload is copied into the channel, which completes the send
        for link in links.iter() {
            self.post(link.peer, link.send_tag, link.send.to_vec())?;
        }
        for link in links.iter_mut() {
            let line = self.take(link.peer, link.recv_tag)?;
            if line.len() != link.recv.len() {
                return Err(Error::Transport(format!(
                    "rank {} expected {} values from rank {}, got {}",
                    self.rank,
                    link.recv.len(),
                    link.peer,
                    line.len()
                )));
            }
            link.recv.copy_from_slice(&line);
        }
        trace!(rank = self.rank, links = links.len(), "halo exchanged");
        Ok(())
    }

    fn send_token(&self, dest: usize, tag: Tag) -> Result<()> {
        self.post(dest, tag, Vec::new())
    }

    fn recv_token(&self, source: usize, tag: Tag) -> Result<()> {
        self.take(source, tag).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run<T: Send>(size: usize, f: impl Fn(ThreadComm) -> T + Sync) -> Vec<T> {
        let comms = ThreadUniverse::new(size).unwrap();
        thread::scope(|s| {
            let handles: Vec<_> = comms.into_iter().map(|c| s.spawn(|| f(c))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn max_reduction_is_identical_everywhere() {
        let out = run(4, |c| c.all_reduce_max(c.rank() as f64 * 0.5 - 1.0).unwrap());
        assert_eq!(out, vec![0.5; 4]);
    }

    #[test]
    fn repeated_reductions_do_not_mix_rounds() {
        let out = run(3, |c| {
            (0..50)
                .map(|round| c.all_reduce_max((round * 10 + c.rank()) as f64).unwrap())
                .collect::<Vec<_>>()
        });
        let expected: Vec<f64> = (0..50).map(|round| (round * 10 + 2) as f64).collect();
        assert!(out.iter().all(|v| *v == expected));
    }

    #[test]
    fn broadcast_from_root() {
        let out = run(3, |c| {
            let mut v = if c.rank() == 0 { 42 } else { 0 };
            c.broadcast(&mut v, 0).unwrap();
            v
        });
        assert_eq!(out, vec![42, 42, 42]);
    }

    #[test]
    fn tokens_sequence_ranks() {
        let order = Mutex::new(Vec::new());
        run(3, |c| {
            if c.rank() > 0 {
                c.recv_token(c.rank() - 1, OUTPUT_TOKEN).unwrap();
            }
            order.lock().unwrap().push(c.rank());
            if c.rank() + 1 < c.size() {
                c.send_token(c.rank() + 1, OUTPUT_TOKEN).unwrap();
            }
        });
        assert_eq!(order.into_inner().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn hung_up_peer_is_a_transport_error() {
        let mut comms = ThreadUniverse::new(2).unwrap();
        let peer = comms.pop().unwrap();
        drop(peer);
        let c = comms.pop().unwrap();
        assert!(matches!(c.recv_token(1, OUTPUT_TOKEN), Err(Error::Transport(_))));
        assert!(matches!(c.send_token(1, OUTPUT_TOKEN), Err(Error::Transport(_))));
    }

    #[test]
    fn panicked_rank_releases_peers_in_a_reduction() {
        let comms = ThreadUniverse::new(3).unwrap();
        let outcomes: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|c| {
                    s.spawn(move || {
                        if c.rank() == 1 {
                            panic!("rank 1 fails before the reduction");
                        }
                        c.all_reduce_max(1.0)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });
        assert!(outcomes[1].is_err());
        for rank in [0, 2] {
            match &outcomes[rank] {
                Ok(Err(Error::Transport(_))) => {}
                other => panic!("rank {rank}: expected a transport error, got {other:?}"),
            }
        }
    }

    #[test]
    fn departed_rank_fails_later_collectives() {
        let out = run(3, |c| {
            if c.rank() == 2 {
                return None;
            }
            let mut v = 7;
            Some((c.barrier(), c.broadcast(&mut v, 0)))
        });
        for (barrier, broadcast) in out.into_iter().flatten() {
            assert!(matches!(barrier, Err(Error::Transport(_))));
            assert!(matches!(broadcast, Err(Error::Transport(_))));
        }
    }

    #[test]
    fn ranks_leaving_after_a_completed_collective_do_not_disturb_it() {
        // the first rank out drops its comm while the others may still be
        // waking from the last barrier
        for _ in 0..20 {
            let out = run(4, |c| {
                c.barrier().unwrap();
                c.all_reduce_max(c.rank() as f64)
            });
            assert!(out.iter().all(|r| matches!(r, Ok(m) if *m == 3.0)));
        }
    }
}
