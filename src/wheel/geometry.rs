//! Offset and wrap arithmetic for a circular reel rendered as a finite strip.
//!
//! The rendered strip holds three copies of the items: one before the
//! originals, the originals, one after. Logical index `i` is drawn at strip
//! row `i + item_count`, so a single step past either end still lands on a
//! real row showing the right item. After such a step the offset is jumped
//! to the equivalent row inside the originals.

use crate::error::WheelError;
use crate::model::SpinDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelGeometry {
    item_count: usize,
    item_height: f64,
}

/// Result of advancing one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Logical index the animated transition lands on, possibly one past
    /// either end (`-1` or `item_count`).
    pub target: isize,
    /// Logical index after wrapping into `[0, item_count)`.
    pub position: usize,
}

impl Step {
    /// Whether the step crossed the wrap seam and the strip must be reset.
    pub fn wrapped(&self) -> bool {
        self.target != self.position as isize
    }
}

impl ReelGeometry {
    pub fn new(item_count: usize, item_height: f64) -> Result<Self, WheelError> {
        if item_count == 0 {
            return Err(WheelError::EmptyReel);
        }
        if !item_height.is_finite() || item_height <= 0.0 {
            return Err(WheelError::InvalidItemHeight(item_height));
        }
        Ok(Self {
            item_count,
            item_height,
        })
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    /// Rows rendered before logical index 0.
    pub fn wrap_offset(&self) -> usize {
        self.item_count
    }

    /// Strip offset that aligns logical `index` with the window.
    /// `index` may sit one step outside the logical range.
    pub fn offset_for(&self, index: isize) -> f64 {
        -((index + self.wrap_offset() as isize) as f64) * self.item_height
    }

    /// Fold any integer into `[0, item_count)`.
    pub fn normalize(&self, index: isize) -> usize {
        index.rem_euclid(self.item_count as isize) as usize
    }

    pub fn step(&self, position: usize, direction: SpinDirection) -> Step {
        let target = position as isize + direction.step();
        Step {
            target,
            position: self.normalize(target),
        }
    }

    /// Strip row currently centred for a given offset (fractional while moving).
    pub fn row_at(&self, offset: f64) -> f64 {
        -offset / self.item_height
    }
}

/// Build the rendered strip: a copy of `items`, the items, and another copy.
pub fn render_strip<T: Clone>(items: &[T]) -> Vec<T> {
    let mut strip = Vec::with_capacity(items.len() * 3);
    for _ in 0..3 {
        strip.extend_from_slice(items);
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reel(n: usize) -> ReelGeometry {
        ReelGeometry::new(n, 10.0).unwrap()
    }

    #[test]
    fn offset_includes_wrap_rows() {
        let g = reel(5);
        assert_eq!(g.offset_for(0), -50.0);
        assert_eq!(g.offset_for(2), -70.0);
        assert_eq!(g.offset_for(-1), -40.0);
        assert_eq!(g.offset_for(5), -100.0);
    }

    #[test]
    fn forward_step_wraps_at_the_end() {
        let g = reel(5);
        let s = g.step(4, SpinDirection::Forward);
        assert_eq!(s.target, 5);
        assert_eq!(s.position, 0);
        assert!(s.wrapped());
        assert!(!g.step(3, SpinDirection::Forward).wrapped());
    }

    #[test]
    fn backward_step_wraps_at_the_start() {
        let g = reel(5);
        let s = g.step(0, SpinDirection::Backward);
        assert_eq!(s.target, -1);
        assert_eq!(s.position, 4);
        assert!(s.wrapped());
    }

    #[test]
    fn full_cycle_returns_to_start() {
        for n in 2..12 {
            let g = reel(n);
            for direction in [SpinDirection::Forward, SpinDirection::Backward] {
                for start in 0..n {
                    let mut pos = start;
                    for _ in 0..n {
                        pos = g.step(pos, direction).position;
                    }
                    assert_eq!(pos, start, "n={n} start={start} {direction:?}");
                }
            }
        }
    }

    #[test]
    fn wrapped_target_shows_the_same_item_as_its_reset() {
        let items = ["a", "b", "c", "d"];
        let strip = render_strip(&items);
        let g = reel(items.len());
        for direction in [SpinDirection::Forward, SpinDirection::Backward] {
            for pos in 0..items.len() {
                let s = g.step(pos, direction);
                let landed = g.row_at(g.offset_for(s.target)) as usize;
                let reset = g.row_at(g.offset_for(s.position as isize)) as usize;
                assert_eq!(strip[landed], strip[reset]);
                assert_eq!(strip[reset], items[s.position]);
            }
        }
    }

    #[test]
    fn rejects_degenerate_reels() {
        assert_eq!(ReelGeometry::new(0, 10.0), Err(WheelError::EmptyReel));
        assert!(matches!(
            ReelGeometry::new(3, 0.0),
            Err(WheelError::InvalidItemHeight(_))
        ));
        assert!(matches!(
            ReelGeometry::new(3, f64::NAN),
            Err(WheelError::InvalidItemHeight(_))
        ));
    }
}
