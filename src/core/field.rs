//! Ghost-aware local storage for one worker's slice of the grid.
//!
//! A [`HaloField`] is `owned + 2` lines of `width` values, stored line-major.
//! Line `0` is the lower ghost, lines `1..=owned` are owned by this worker and
//! line `owned + 1` is the upper ghost. In 1-D a line is a single value; in
//! 2-D it is one full row of the undecomposed dimension.

use std::ops::{Index, IndexMut, Range};

#[derive(Clone, Debug, PartialEq)]
pub struct HaloField {
    owned: usize,
    width: usize,
    data: Vec<f64>,
}

/// Disjoint borrows of the four lines touched by a halo exchange.
///
/// `first_owned` and `last_owned` alias when a worker owns a single line.
pub struct HaloView<'a> {
    pub lower_ghost: &'a mut [f64],
    pub first_owned: &'a [f64],
    pub last_owned: &'a [f64],
    pub upper_ghost: &'a mut [f64],
}

impl HaloField {
    pub fn zeros(owned: usize, width: usize) -> Self {
        assert!(owned > 0, "a worker must own at least one line");
        assert!(width > 0, "lines must hold at least one value");
        Self { owned, width, data: vec![0.0; (owned + 2) * width] }
    }

    /// Number of owned lines.
    pub fn owned_lines(&self) -> usize { self.owned }

    /// Values per line.
    pub fn width(&self) -> usize { self.width }

    /// Total lines including both ghosts.
    pub fn lines(&self) -> usize { self.owned + 2 }

    /// Local indices of the owned lines.
    pub fn owned_range(&self) -> Range<usize> { 1..self.owned + 1 }

    pub fn line(&self, l: usize) -> &[f64] {
        let w = self.width;
        &self.data[l * w..(l + 1) * w]
    }

    pub fn line_mut(&mut self, l: usize) -> &mut [f64] {
        let w = self.width;
        &mut self.data[l * w..(l + 1) * w]
    }

    pub fn lower_ghost(&self) -> &[f64] { self.line(0) }
    pub fn upper_ghost(&self) -> &[f64] { self.line(self.owned + 1) }
    pub fn lower_ghost_mut(&mut self) -> &mut [f64] { self.line_mut(0) }
    pub fn upper_ghost_mut(&mut self) -> &mut [f64] {
        let l = self.owned + 1;
        self.line_mut(l)
    }

    pub fn first_owned(&self) -> &[f64] { self.line(1) }
    pub fn last_owned(&self) -> &[f64] { self.line(self.owned) }

    /// Owned lines as one contiguous block.
    pub fn owned_values(&self) -> &[f64] {
        let w = self.width;
        &self.data[w..(self.owned + 1) * w]
    }

    /// Copy-forward of the whole local array, ghosts included.
    pub fn copy_from(&mut self, other: &HaloField) {
        assert_eq!((self.owned, self.width), (other.owned, other.width), "field shapes differ");
        self.data.copy_from_slice(&other.data);
    }

    /// Splits the field into the send and receive lines of a halo exchange.
    pub fn halo_view(&mut self) -> HaloView<'_> {
        let w = self.width;
        let (lower_ghost, rest) = self.data.split_at_mut(w);
        let (owned, upper_ghost) = rest.split_at_mut(self.owned * w);
        let owned: &[f64] = owned;
        HaloView {
            lower_ghost,
            first_owned: &owned[..w],
            last_owned: &owned[(self.owned - 1) * w..],
            upper_ghost,
        }
    }
}

impl Index<(usize, usize)> for HaloField {
    type Output = f64;
    fn index(&self, (l, c): (usize, usize)) -> &f64 {
        debug_assert!(c < self.width);
        &self.data[l * self.width + c]
    }
}

impl IndexMut<(usize, usize)> for HaloField {
    fn index_mut(&mut self, (l, c): (usize, usize)) -> &mut f64 {
        debug_assert!(c < self.width);
        &mut self.data[l * self.width + c]
    }
}
