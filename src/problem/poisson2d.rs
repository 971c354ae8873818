//! Two-dimensional Poisson problem `u_xx + u_yy = f(x, y)` on `[a, b]^2`.
//!
//! Rows (constant `y`) are striped across ranks; a row holds all
//! `num_points + 2` columns including the left and right Dirichlet columns.
//! Rank 0 owns the bottom boundary row, rank `P-1` the top one.

use crate::core::field::HaloField;
use crate::core::traits::{Dimension, Problem};
use crate::partition::{Partition, Topology};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug)]
pub struct Poisson2d {
    pub num_points: usize,
    pub a: f64,
    pub b: f64,
    pub source: fn(f64, f64) -> f64,
    /// `u(x, a)`
    pub bottom: fn(f64) -> f64,
    /// `u(x, b)`
    pub top: fn(f64) -> f64,
    /// `u(a, y)`
    pub left: fn(f64) -> f64,
    /// `u(b, y)`
    pub right: fn(f64) -> f64,
}

impl Poisson2d {
    /// `f = -20 sin x cos 3y` on `[0, pi]^2` with `u(0, y) = u(pi, y) = 0`,
    /// `u(x, 0) = 2 sin x` and `u(x, pi) = -2 sin x`. The exact solution is
    /// `2 sin x cos 3y`.
    pub fn reference(num_points: usize) -> Self {
        Self {
            num_points,
            a: 0.0,
            b: PI,
            source: |x, y| -20.0 * x.sin() * (3.0 * y).cos(),
            bottom: |x| 2.0 * x.sin(),
            top: |x| -2.0 * x.sin(),
            left: |_| 0.0,
            right: |_| 0.0,
        }
    }
}

impl Problem for Poisson2d {
    fn dimension(&self) -> Dimension { Dimension::Two }
    fn num_points(&self) -> usize { self.num_points }
    fn bounds(&self) -> (f64, f64) { (self.a, self.b) }

    fn initialize(
        &self,
        partition: &Partition,
        topology: &Topology,
        current: &mut HaloField,
        source: &mut HaloField,
    ) {
        let last_col = self.num_points + 1;
        for l in current.owned_range() {
            let y = self.coordinate(partition.global_index(l));
            for c in 1..last_col {
                source[(l, c)] = (self.source)(self.coordinate(c), y);
                current[(l, c)] = 0.0;
            }
            current[(l, 0)] = (self.left)(y);
            current[(l, last_col)] = (self.right)(y);
        }
        if topology.owns_left_boundary() {
            for (c, u) in current.lower_ghost_mut().iter_mut().enumerate() {
                *u = (self.bottom)(self.coordinate(c));
            }
        }
        if topology.owns_right_boundary() {
            for (c, u) in current.upper_ghost_mut().iter_mut().enumerate() {
                *u = (self.top)(self.coordinate(c));
            }
        }
    }
}
