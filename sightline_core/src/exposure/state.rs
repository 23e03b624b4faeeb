// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exposure snapshots.

use alloc::vec::Vec;

use kurbo::Rect;

/// An immutable snapshot of how much of a view is on screen.
///
/// All rectangles are in the window's screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ExposureState {
    /// Fraction of the view's area that is visible and unobstructed, in
    /// `[0, 1]`.
    pub fraction: f64,
    /// The part of the view that survives ancestor clipping and the
    /// viewport. [`Rect::ZERO`] when nothing is visible.
    pub visible_rect: Rect,
    /// The view's full rectangle.
    pub total_rect: Rect,
    /// Regions of `visible_rect` covered by views drawn above the target.
    pub obstructions: Vec<Rect>,
}

impl ExposureState {
    /// A snapshot for a view that is attached but contributes nothing to the
    /// screen (hidden, transparent, or scrolled out).
    #[must_use]
    pub fn invisible(total_rect: Rect) -> Self {
        Self {
            fraction: 0.0,
            visible_rect: Rect::ZERO,
            total_rect,
            obstructions: Vec::new(),
        }
    }

    /// Returns `true` if any part of the view is exposed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.fraction > 0.0
    }

    /// Returns `true` if `other` reports the same exposure.
    ///
    /// Two snapshots are the same exposure when their fraction and visible
    /// rectangle match; obstruction bookkeeping alone is not a change
    /// observers are notified about.
    #[must_use]
    pub fn same_exposure(&self, other: &Self) -> bool {
        self.fraction == other.fraction && self.visible_rect == other.visible_rect
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn same_exposure_ignores_obstruction_list() {
        let a = ExposureState {
            fraction: 0.5,
            visible_rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            total_rect: Rect::new(0.0, 0.0, 10.0, 20.0),
            obstructions: Vec::new(),
        };
        let b = ExposureState {
            obstructions: vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
            ..a.clone()
        };
        assert!(a.same_exposure(&b));
        assert_ne!(a, b);

        let c = ExposureState {
            fraction: 0.25,
            ..a.clone()
        };
        assert!(!a.same_exposure(&c));
    }

    #[test]
    fn invisible_snapshot() {
        let total = Rect::new(0.0, -100.0, 50.0, -50.0);
        let state = ExposureState::invisible(total);
        assert!(!state.is_visible());
        assert_eq!(state.visible_rect, Rect::ZERO);
        assert_eq!(state.total_rect, total);
    }
}
