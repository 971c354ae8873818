//! One-dimensional Poisson problem `u''(x) = f(x)` on `[a, b]` with
//! `u(a) = alpha`, `u(b) = beta`.

use crate::core::field::HaloField;
use crate::core::traits::{Dimension, Problem};
use crate::partition::{Partition, Topology};

#[derive(Clone, Copy, Debug)]
pub struct Poisson1d {
    pub num_points: usize,
    pub a: f64,
    pub b: f64,
    pub alpha: f64,
    pub beta: f64,
    pub source: fn(f64) -> f64,
}

impl Poisson1d {
    pub fn new(num_points: usize, a: f64, b: f64, alpha: f64, beta: f64, source: fn(f64) -> f64) -> Self {
        Self { num_points, a, b, alpha, beta, source }
    }

    /// `u'' = e^x` on `[0, 1]`, `u(0) = 0`, `u(1) = 3`.
    pub fn reference(num_points: usize) -> Self {
        Self::new(num_points, 0.0, 1.0, 0.0, 3.0, f64::exp)
    }

    /// Straight line between the two boundary values.
    fn initial_guess(&self, x: f64) -> f64 {
        self.alpha + (x - self.a) / (self.b - self.a) * (self.beta - self.alpha)
    }
}

impl Problem for Poisson1d {
    fn dimension(&self) -> Dimension { Dimension::One }
    fn num_points(&self) -> usize { self.num_points }
    fn bounds(&self) -> (f64, f64) { (self.a, self.b) }

    fn initialize(
        &self,
        partition: &Partition,
        topology: &Topology,
        current: &mut HaloField,
        source: &mut HaloField,
    ) {
        for l in current.owned_range() {
            let x = self.coordinate(partition.global_index(l));
            source[(l, 0)] = (self.source)(x);
            current[(l, 0)] = self.initial_guess(x);
        }
        if topology.owns_left_boundary() {
            current.lower_ghost_mut()[0] = self.alpha;
        }
        if topology.owns_right_boundary() {
            current.upper_ghost_mut()[0] = self.beta;
        }
    }
}
