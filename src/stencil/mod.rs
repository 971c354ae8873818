//! Jacobi sweeps over a worker's owned points.
//!
//! Every sweep reads only `previous` and `source` and writes only the owned
//! points of `current`: owned lines, and in 2-D only the interior columns.
//! Ghost lines and Dirichlet columns of `current` are never written.
//!
//! The returned local max change is `max |current - previous|` over the
//! updated points. A NaN change is reported as `+inf` so that it survives a
//! max-reduction and surfaces as non-convergence.

use crate::core::field::HaloField;
use crate::core::traits::Dimension;

/// One Jacobi sweep with the stencil matching `dimension`.
pub fn sweep(dimension: Dimension, previous: &HaloField, source: &HaloField, current: &mut HaloField, dx: f64) -> f64 {
    match dimension {
        Dimension::One => sweep_three_point(previous, source, current, dx),
        Dimension::Two => sweep_five_point(previous, source, current, dx),
    }
}

/// `u[i] = 0.5 * (u_old[i-1] + u_old[i+1] - dx^2 f[i])`
pub fn sweep_three_point(previous: &HaloField, source: &HaloField, current: &mut HaloField, dx: f64) -> f64 {
    debug_assert_eq!(previous.width(), 1);
    let dx2 = dx * dx;
    let mut du_max = 0.0;
    for i in current.owned_range() {
        let u = 0.5 * (previous[(i - 1, 0)] + previous[(i + 1, 0)] - dx2 * source[(i, 0)]);
        current[(i, 0)] = u;
        du_max = max_change(du_max, u - previous[(i, 0)]);
    }
    du_max
}

/// 5-point stencil over interior columns `1..width-1` of every owned row.
pub fn sweep_five_point(previous: &HaloField, source: &HaloField, current: &mut HaloField, dx: f64) -> f64 {
    let width = previous.width();
    debug_assert!(width >= 3);
    let dx2 = dx * dx;
    let mut du_max = 0.0;
    for j in current.owned_range() {
        let below = previous.line(j - 1);
        let row = previous.line(j);
        let above = previous.line(j + 1);
        let f = source.line(j);
        let out = current.line_mut(j);
        for i in 1..width - 1 {
            let u = 0.25 * (row[i - 1] + row[i + 1] + below[i] + above[i] - dx2 * f[i]);
            out[i] = u;
            du_max = max_change(du_max, u - row[i]);
        }
    }
    du_max
}

#[inline]
fn max_change(du_max: f64, delta: f64) -> f64 {
    let delta = delta.abs();
    if delta.is_nan() { f64::INFINITY } else { du_max.max(delta) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn three_point_uses_ghosts_and_source() {
        let mut prev = HaloField::zeros(2, 1);
        prev[(0, 0)] = 1.0;
        prev[(1, 0)] = 2.0;
        prev[(2, 0)] = 3.0;
        prev[(3, 0)] = 4.0;
        let mut src = HaloField::zeros(2, 1);
        src[(1, 0)] = 100.0;
        let mut cur = prev.clone();
        let du = sweep_three_point(&prev, &src, &mut cur, 0.1);
        // 0.5 * (1 + 3 - 0.01 * 100) = 1.5 ; 0.5 * (2 + 4) = 3
        assert_abs_diff_eq!(cur[(1, 0)], 1.5, epsilon = 1e-14);
        assert_abs_diff_eq!(cur[(2, 0)], 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(du, 0.5, epsilon = 1e-14);
        assert_eq!(cur[(0, 0)], 1.0);
        assert_eq!(cur[(3, 0)], 4.0);
    }

    #[test]
    fn five_point_leaves_dirichlet_columns_alone() {
        let width = 4;
        let mut prev = HaloField::zeros(1, width);
        prev.lower_ghost_mut().copy_from_slice(&[9.0, 1.0, 1.0, 9.0]);
        prev.upper_ghost_mut().copy_from_slice(&[9.0, 3.0, 3.0, 9.0]);
        prev.line_mut(1).copy_from_slice(&[5.0, 0.0, 0.0, 7.0]);
        let src = HaloField::zeros(1, width);
        let mut cur = prev.clone();
        let du = sweep_five_point(&prev, &src, &mut cur, 0.5);
        // col 1: 0.25 * (5 + 0 + 1 + 3) ; col 2: 0.25 * (0 + 7 + 1 + 3)
        assert_abs_diff_eq!(cur[(1, 1)], 2.25, epsilon = 1e-14);
        assert_abs_diff_eq!(cur[(1, 2)], 2.75, epsilon = 1e-14);
        assert_eq!(cur[(1, 0)], 5.0);
        assert_eq!(cur[(1, 3)], 7.0);
        assert_eq!(cur.lower_ghost(), prev.lower_ghost());
        assert_abs_diff_eq!(du, 2.75, epsilon = 1e-14);
    }

    #[test]
    fn nan_change_is_never_below_tolerance() {
        let mut prev = HaloField::zeros(1, 1);
        prev[(0, 0)] = f64::NAN;
        let src = HaloField::zeros(1, 1);
        let mut cur = prev.clone();
        let du = sweep(Dimension::One, &prev, &src, &mut cur, 0.1);
        assert!(du.is_infinite());
    }
}
