//! Command-line or API options for a solver run.
//!
//! `SolverOptions` selects the problem dimension and size, the iteration cap
//! and progress interval, and where and how the per-rank solution is
//! written. Builds without MPI also choose how many in-process ranks to run.
//! The point count may be left unset, in which case rank 0 asks for it on
//! stdin before broadcasting it.

use crate::core::traits::Dimension;
use crate::error::{Error, Result};
use crate::output::{OutputMode, OutputTarget};
use crate::solver::DEFAULT_PRINT_INTERVAL;
use std::io::BufRead;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: jacobi [options]
  --dim <1|2>               problem dimension (default 1)
  --points <N>              interior points per dimension (asked on stdin if absent)
  --max-iterations <N>      iteration cap (default 10000 in 1-D, 65536 in 2-D)
  --print-interval <N>      progress report period on rank 0, 0 disables (default 1000)
  --output <per-rank|ordered>
                            one file per rank, or one file written in rank order
  --out-dir <PATH>          output directory (default .)
  --prefix <NAME>           output file prefix (default jacobi)
  --ranks <P>               in-process ranks when built without MPI (default 1)";

/// Run options.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub dimension: Dimension,
    /// Interior points per dimension; `None` means ask on stdin.
    pub num_points: Option<usize>,
    /// Iteration cap; `None` picks the per-dimension default.
    pub max_iterations: Option<usize>,
    pub print_interval: usize,
    pub output: OutputTarget,
    /// In-process ranks; ignored when running under MPI.
    pub ranks: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            dimension: Dimension::One,
            num_points: None,
            max_iterations: None,
            print_interval: DEFAULT_PRINT_INTERVAL,
            output: OutputTarget::default(),
            ranks: 1,
        }
    }
}

impl SolverOptions {
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut opts = Self::default();
        let mut args = args.into_iter().map(Into::into);
        while let Some(flag) = args.next() {
            let flag_name: &'static str = match flag.as_str() {
                "--dim" => "--dim",
                "--points" => "--points",
                "--max-iterations" => "--max-iterations",
                "--print-interval" => "--print-interval",
                "--output" => "--output",
                "--out-dir" => "--out-dir",
                "--prefix" => "--prefix",
                "--ranks" => "--ranks",
                other => return Err(Error::Config(format!("unknown option `{other}`\n{USAGE}"))),
            };
            let value = args
                .next()
                .ok_or_else(|| Error::Config(format!("missing value for {flag_name}")))?;
            match flag_name {
                "--dim" => {
                    opts.dimension = match value.as_str() {
                        "1" | "1d" => Dimension::One,
                        "2" | "2d" => Dimension::Two,
                        _ => return Err(Error::Parse { option: flag_name, value }),
                    }
                }
                "--points" => opts.num_points = Some(parse_count(flag_name, value)?),
                "--max-iterations" => opts.max_iterations = Some(parse_count(flag_name, value)?),
                "--print-interval" => opts.print_interval = parse_usize(flag_name, value)?,
                "--output" => {
                    opts.output.mode = match value.as_str() {
                        "per-rank" => OutputMode::PerRank,
                        "ordered" => OutputMode::Ordered,
                        _ => return Err(Error::Parse { option: flag_name, value }),
                    }
                }
                "--out-dir" => opts.output.dir = PathBuf::from(value),
                "--prefix" => {
                    if value.is_empty() || value.contains(std::path::MAIN_SEPARATOR) {
                        return Err(Error::Parse { option: flag_name, value });
                    }
                    opts.output.prefix = value;
                }
                _ => opts.ranks = parse_count(flag_name, value)?,
            }
        }
        Ok(opts)
    }

    /// Iteration cap for the selected dimension.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(match self.dimension {
            Dimension::One => 10_000,
            Dimension::Two => 1 << 16,
        })
    }
}

fn parse_usize(option: &'static str, value: String) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| Error::Parse { option, value })
}

/// Strictly positive count.
fn parse_count(option: &'static str, value: String) -> Result<usize> {
    match parse_usize(option, value.clone())? {
        0 => Err(Error::Parse { option, value }),
        n => Ok(n),
    }
}

/// Reads the interior point count from the first non-empty line of `input`.
pub fn read_num_points<R: BufRead>(input: R) -> Result<usize> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        return parse_count("number of points", line);
    }
    Err(Error::Config("no point count given on stdin".into()))
}
