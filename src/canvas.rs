// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shared render surface.
//!
//! A [`Canvas`](struct.Canvas.html) is a fixed-size grid of
//! normalized divergence values plus a parallel grid of
//! processed flags.  Workers of one round share it through an `Arc`
//! and write to it without locks; correctness comes from the band
//! partition (each row stripe has exactly one owner, see the worker
//! module), not from the storage.  The cells are atomics purely so
//! the sharing is sound: every write settles before the round's
//! completion signal is drained, and the orchestrator only reads
//! between rounds.
//!
//! A cell's flag is monotonic for the life of a render.  Once an
//! origin is marked processed its value never changes again until
//! [`reset`](struct.Canvas.html#method.reset) wipes the whole grid
//! for a new set of parameters.

use itertools::iproduct;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A W×H grid of divergence values and processed flags.
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Box<[AtomicU64]>,
    flags: Box<[AtomicBool]>,
}

impl Canvas {
    /// Allocates a zeroed canvas.  Every value starts at 0.0 and
    /// every flag unprocessed.
    pub fn new(width: usize, height: usize) -> Canvas {
        let len = width * height;
        Canvas {
            width,
            height,
            cells: (0..len).map(|_| AtomicU64::new(0)).collect(),
            flags: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the canvas has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The divergence value at one cell.
    pub fn value(&self, x: usize, y: usize) -> f64 {
        f64::from_bits(self.cells[y * self.width + x].load(Ordering::Relaxed))
    }

    /// Stamps `value` over the `size × size` block whose origin is
    /// `(x, y)`, clipped to the canvas bounds.  The origin itself is
    /// assumed in-bounds; the tail of a block hanging off the right
    /// or bottom edge is silently dropped.
    pub fn stamp(&self, x: usize, y: usize, size: usize, value: f64) {
        let bits = value.to_bits();
        for (v, u) in iproduct!(0..size, 0..size) {
            let (px, py) = (x + u, y + v);
            if px < self.width && py < self.height {
                self.cells[py * self.width + px].store(bits, Ordering::Relaxed);
            }
        }
    }

    /// Whether the block origin at `(x, y)` has been evaluated.
    pub fn is_processed(&self, x: usize, y: usize) -> bool {
        self.flags[y * self.width + x].load(Ordering::Relaxed)
    }

    /// Marks the block origin at `(x, y)` as evaluated.  Flags only
    /// ever go from false to true; nothing unmarks a cell short of a
    /// full reset.
    pub fn mark_processed(&self, x: usize, y: usize) {
        self.flags[y * self.width + x].store(true, Ordering::Relaxed);
    }

    /// Number of cells marked processed so far.  A finished render
    /// has every cell marked.
    pub fn processed_cells(&self) -> usize {
        self.flags
            .iter()
            .filter(|f| f.load(Ordering::Relaxed))
            .count()
    }

    /// Returns the canvas to its freshly-allocated state, ready for a
    /// render with new parameters.  Only safe to call between rounds,
    /// when no worker holds the canvas.
    pub fn reset(&self) {
        for cell in self.cells.iter() {
            cell.store(0, Ordering::Relaxed);
        }
        for flag in self.flags.iter() {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_canvas_is_zeroed() {
        let canvas = Canvas::new(4, 3);
        assert_eq!(canvas.len(), 12);
        assert!(!canvas.is_empty());
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(canvas.value(x, y), 0.0);
                assert!(!canvas.is_processed(x, y));
            }
        }
    }

    #[test]
    fn stamp_fills_a_square() {
        let canvas = Canvas::new(8, 8);
        canvas.stamp(2, 4, 2, 0.5);
        assert_eq!(canvas.value(2, 4), 0.5);
        assert_eq!(canvas.value(3, 5), 0.5);
        assert_eq!(canvas.value(1, 4), 0.0);
        assert_eq!(canvas.value(4, 4), 0.0);
        assert_eq!(canvas.value(2, 6), 0.0);
    }

    #[test]
    fn stamp_clips_at_the_edges() {
        let canvas = Canvas::new(10, 10);
        canvas.stamp(8, 8, 8, 0.25);
        assert_eq!(canvas.value(8, 8), 0.25);
        assert_eq!(canvas.value(9, 9), 0.25);
        assert_eq!(canvas.value(7, 9), 0.0);
    }

    #[test]
    fn flags_are_independent_of_values() {
        let canvas = Canvas::new(4, 4);
        canvas.mark_processed(1, 1);
        assert!(canvas.is_processed(1, 1));
        assert!(!canvas.is_processed(1, 2));
        assert_eq!(canvas.value(1, 1), 0.0);
        assert_eq!(canvas.processed_cells(), 1);
    }

    #[test]
    fn reset_clears_values_and_flags() {
        let canvas = Canvas::new(4, 4);
        canvas.stamp(0, 0, 4, 0.75);
        canvas.mark_processed(0, 0);
        canvas.reset();
        assert_eq!(canvas.value(3, 3), 0.0);
        assert!(!canvas.is_processed(0, 0));
        assert_eq!(canvas.processed_cells(), 0);
    }
}
