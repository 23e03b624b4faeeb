// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining hierarchy changes into signals.
//!
//! The host mutates the [`ViewTree`] freely during a turn of its event loop
//! and then calls [`ViewTree::evaluate`] once. Each dirty channel is drained
//! into a list of raw slot indices:
//!
//! 1. **GEOMETRY**: every view whose on-screen rectangle may have moved,
//!    including all descendants of a scrolled or resized view.
//! 2. **VISIBILITY**: every view whose effective visibility may have changed.
//! 3. **SCROLL** / **LAYOUT**: the views that were directly scrolled or
//!    resized.
//! 4. **TOPOLOGY**: drained and folded into
//!    [`ViewChanges::topology_changed`].
//!
//! The resulting [`ViewChanges`] is shared by every tracker attached to the
//! tree; each tracker's event source filters it against its own
//! subscription.

use alloc::vec::Vec;

use super::store::ViewTree;
use crate::dirty;

/// Signals produced by a single [`ViewTree::evaluate`] call.
///
/// Indices are raw slot indices (compare with
/// [`ViewId::index`](super::ViewId::index)).
#[derive(Clone, Debug, Default)]
pub struct ViewChanges {
    /// Views whose world rectangle may have changed.
    pub geometry: Vec<u32>,
    /// Views whose effective visibility may have changed.
    pub visibility: Vec<u32>,
    /// Views whose content offset was changed directly.
    pub scrolled: Vec<u32>,
    /// Views whose frame was changed directly.
    pub layout: Vec<u32>,
    /// Views created since the last evaluate.
    pub added: Vec<u32>,
    /// Views destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether any view was attached, detached, created, or destroyed.
    pub topology_changed: bool,
}

impl ViewChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.visibility.clear();
        self.scrolled.clear();
        self.layout.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
            && self.visibility.is_empty()
            && self.scrolled.is_empty()
            && self.layout.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl ViewTree {
    /// Drains all dirty channels and returns the resulting signals.
    pub fn evaluate(&mut self) -> ViewChanges {
        let mut changes = ViewChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut ViewChanges) {
        changes.clear();

        changes.geometry = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.visibility = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.scrolled = self
            .dirty
            .drain(dirty::SCROLL)
            .deterministic()
            .run()
            .collect();

        changes.layout = self
            .dirty
            .drain(dirty::LAYOUT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = core::mem::take(&mut self.topology_dirty);

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Vec2};

    use super::*;
    use crate::view::ViewFlags;

    fn feed() -> (ViewTree, [crate::view::ViewId; 4]) {
        let mut tree = ViewTree::new();
        let window = tree.create_window(Rect::new(0.0, 0.0, 320.0, 480.0));
        let scroll = tree.create_scroll_view(Rect::new(0.0, 0.0, 320.0, 480.0));
        let cell = tree.create_view(Rect::new(0.0, 100.0, 320.0, 200.0));
        let ad = tree.create_view(Rect::new(10.0, 10.0, 310.0, 90.0));
        tree.add_child(window, scroll);
        tree.add_child(scroll, cell);
        tree.add_child(cell, ad);
        (tree, [window, scroll, cell, ad])
    }

    #[test]
    fn creation_is_reported_once() {
        let (mut tree, [window, _, _, ad]) = feed();
        let changes = tree.evaluate();
        assert!(changes.topology_changed);
        assert!(changes.added.contains(&window.index()));
        assert!(changes.added.contains(&ad.index()));

        let changes = tree.evaluate();
        assert!(changes.is_empty(), "second evaluate should be quiet");
    }

    #[test]
    fn scroll_reaches_nested_descendants() {
        let (mut tree, [window, scroll, cell, ad]) = feed();
        let _ = tree.evaluate();

        tree.set_content_offset(scroll, Vec2::new(0.0, 40.0));
        let changes = tree.evaluate();

        assert_eq!(changes.scrolled, &[scroll.index()]);
        assert!(changes.geometry.contains(&cell.index()));
        assert!(changes.geometry.contains(&ad.index()));
        assert!(
            !changes.geometry.contains(&window.index()),
            "scrolling must not dirty ancestors"
        );
        assert!(changes.layout.is_empty());
        assert!(!changes.topology_changed);
    }

    #[test]
    fn unchanged_offset_is_not_a_scroll() {
        let (mut tree, [_, scroll, _, _]) = feed();
        let _ = tree.evaluate();

        tree.set_content_offset(scroll, Vec2::ZERO);
        assert!(tree.evaluate().is_empty());
    }

    #[test]
    fn window_resize_is_layout() {
        let (mut tree, [window, _, _, ad]) = feed();
        let _ = tree.evaluate();

        tree.set_frame(window, Rect::new(0.0, 0.0, 480.0, 320.0));
        let changes = tree.evaluate();

        assert_eq!(changes.layout, &[window.index()]);
        assert!(changes.geometry.contains(&ad.index()));
    }

    #[test]
    fn hiding_propagates_visibility() {
        let (mut tree, [_, _, cell, ad]) = feed();
        let _ = tree.evaluate();

        tree.set_flags(
            cell,
            ViewFlags {
                hidden: true,
                ..ViewFlags::default()
            },
        );
        let changes = tree.evaluate();
        assert!(changes.visibility.contains(&cell.index()));
        assert!(changes.visibility.contains(&ad.index()));
        assert!(changes.geometry.is_empty());
    }

    #[test]
    fn detaching_marks_subtree_and_topology() {
        let (mut tree, [_, _, cell, ad]) = feed();
        let _ = tree.evaluate();

        tree.remove_from_parent(cell);
        let changes = tree.evaluate();
        assert!(changes.topology_changed);
        assert!(changes.geometry.contains(&ad.index()));
    }

    #[test]
    fn destroy_is_reported_in_removed() {
        let (mut tree, [_, _, _, ad]) = feed();
        let _ = tree.evaluate();

        tree.destroy_view(ad);
        let changes = tree.evaluate();
        assert!(changes.removed.contains(&ad.index()));
        assert!(changes.topology_changed);
    }

    #[test]
    fn evaluate_into_reuses_buffer() {
        let (mut tree, [_, scroll, _, _]) = feed();
        let mut changes = ViewChanges::default();
        tree.evaluate_into(&mut changes);
        assert_eq!(changes.added.len(), 4);

        tree.set_content_offset(scroll, Vec2::new(0.0, 1.0));
        tree.evaluate_into(&mut changes);
        assert!(changes.added.is_empty(), "added should be cleared");
        assert_eq!(changes.scrolled, &[scroll.index()]);
    }
}
