//! Writing each worker's local solution.
//!
//! 1-D files hold one `x value` pair per line; 2-D files hold one grid row
//! per line. Rank 0 additionally writes the left (bottom) Dirichlet boundary
//! first and the last rank writes the right (top) boundary last, so
//! concatenating the files in rank order yields the global solution.

use crate::context::WorkerContext;
use crate::core::traits::{Dimension, Problem};
use crate::error::Result;
use crate::parallel::{Comm, OUTPUT_TOKEN};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// `<dir>/<prefix>_<rank>.txt`, written independently.
    PerRank,
    /// `<dir>/<prefix>.txt`, written by one rank at a time in rank order.
    Ordered,
}

#[derive(Clone, Debug)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub prefix: String,
    pub mode: OutputMode,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self { dir: PathBuf::from("."), prefix: "jacobi".into(), mode: OutputMode::PerRank }
    }
}

impl OutputTarget {
    pub fn rank_path(&self, rank: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.txt", self.prefix, rank))
    }

    pub fn shared_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.prefix))
    }
}

/// Writes this worker's slice according to `target`; returns the file written.
pub fn write_solution<C, P>(comm: &C, target: &OutputTarget, ctx: &WorkerContext<P>) -> Result<PathBuf>
where
    C: Comm + ?Sized,
    P: Problem,
{
    let topology = ctx.topology;
    match target.mode {
        OutputMode::PerRank => {
            let path = target.rank_path(topology.rank());
            let mut w = BufWriter::new(File::create(&path)?);
            write_local(&mut w, ctx)?;
            w.flush()?;
            info!(rank = topology.rank(), path = %path.display(), "solution written");
            Ok(path)
        }
        OutputMode::Ordered => {
            let path = target.shared_path();
            if let Some(left) = topology.left() {
                comm.recv_token(left, OUTPUT_TOKEN)?;
            }
            let file = if topology.is_root() {
                File::create(&path)?
            } else {
                OpenOptions::new().append(true).open(&path)?
            };
            let mut w = BufWriter::new(file);
            write_local(&mut w, ctx)?;
            w.flush()?;
            drop(w);
            if let Some(right) = topology.right() {
                comm.send_token(right, OUTPUT_TOKEN)?;
            }
            info!(rank = topology.rank(), path = %path.display(), "solution appended");
            Ok(path)
        }
    }
}

/// Formats the accepted local solution of `ctx` into `w`.
pub fn write_local<W: Write, P: Problem>(w: &mut W, ctx: &WorkerContext<P>) -> std::io::Result<()> {
    let u = ctx.current();
    let topology = ctx.topology;
    let partition = ctx.partition;
    let problem = &ctx.problem;
    let last = problem.num_points() + 1;
    match problem.dimension() {
        Dimension::One => {
            if topology.owns_left_boundary() {
                writeln!(w, "{} {}", problem.coordinate(0), u.lower_ghost()[0])?;
            }
            for l in u.owned_range() {
                let x = problem.coordinate(partition.global_index(l));
                writeln!(w, "{} {}", x, u[(l, 0)])?;
            }
            if topology.owns_right_boundary() {
                writeln!(w, "{} {}", problem.coordinate(last), u.upper_ghost()[0])?;
            }
        }
        Dimension::Two => {
            if topology.owns_left_boundary() {
                write_row(w, u.lower_ghost())?;
            }
            for l in u.owned_range() {
                write_row(w, u.line(l))?;
            }
            if topology.owns_right_boundary() {
                write_row(w, u.upper_ghost())?;
            }
        }
    }
    Ok(())
}

fn write_row<W: Write>(w: &mut W, row: &[f64]) -> std::io::Result<()> {
    let mut sep = "";
    for v in row {
        write!(w, "{sep}{v}")?;
        sep = " ";
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Topology;
    use crate::problem::{Poisson1d, Poisson2d};

    fn render<P: Problem>(ctx: &WorkerContext<P>) -> String {
        let mut buf = Vec::new();
        write_local(&mut buf, ctx).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn first_rank_leads_with_left_boundary() {
        let ctx = WorkerContext::new(Poisson1d::reference(9), Topology::new(0, 3)).unwrap();
        let text = render(&ctx);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0 0");
        assert!(lines[1].starts_with("0.1 "));
    }

    #[test]
    fn last_rank_ends_with_right_boundary() {
        let ctx = WorkerContext::new(Poisson1d::reference(9), Topology::new(2, 3)).unwrap();
        let text = render(&ctx);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(*lines.last().unwrap(), "1 3");
    }

    #[test]
    fn middle_rank_writes_owned_points_only() {
        let ctx = WorkerContext::new(Poisson1d::reference(9), Topology::new(1, 3)).unwrap();
        assert_eq!(render(&ctx).lines().count(), 3);
    }

    #[test]
    fn rows_in_2d() {
        let ctx = WorkerContext::new(Poisson2d::reference(6), Topology::new(0, 1)).unwrap();
        let text = render(&ctx);
        let rows: Vec<_> = text.lines().collect();
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.split(' ').count() == 8));
    }

    #[test]
    fn file_names_follow_rank() {
        let target = OutputTarget::default();
        assert_eq!(target.rank_path(3), PathBuf::from("./jacobi_3.txt"));
        assert_eq!(target.shared_path(), PathBuf::from("./jacobi.txt"));
    }
}
