// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays view storage with allocation, topology, and property
//! management.

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, ViewId};
use super::kind::{ViewFlags, ViewKind};
use super::traverse::{Ancestors, Children};
use crate::dirty;

/// Struct-of-arrays storage for a view hierarchy.
///
/// Views are addressed by [`ViewId`] handles. Destroyed views are recycled
/// through a free list and generation counters make old handles stale.
///
/// The tree is owned by the host. Trackers only hold handles into it and read
/// it during evaluation, so the host is free to destroy a tracked view at any
/// point.
#[derive(Debug)]
pub struct ViewTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Properties --
    pub(crate) kind: Vec<ViewKind>,
    pub(crate) frame: Vec<Rect>,
    pub(crate) content_offset: Vec<Vec2>,
    pub(crate) alpha: Vec<f64>,
    pub(crate) flags: Vec<ViewFlags>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) topology_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized slot-to-root lookups for one batch of change indices.
#[derive(Clone, Debug, Default)]
pub(crate) struct WindowCache {
    root: Vec<u32>,
    path: Vec<u32>,
}

impl WindowCache {
    /// Forgets every memoized root.
    pub(crate) fn reset(&mut self) {
        self.root.clear();
    }
}

impl ViewTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            frame: Vec::new(),
            content_offset: Vec::new(),
            alpha: Vec::new(),
            flags: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            topology_dirty: false,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a plain view with the given frame (in its future parent's
    /// content coordinates).
    pub fn create_view(&mut self, frame: Rect) -> ViewId {
        self.create(ViewKind::Plain, frame)
    }

    /// Creates a scrollable container.
    pub fn create_scroll_view(&mut self, frame: Rect) -> ViewId {
        self.create(ViewKind::Scroll, frame)
    }

    /// Creates a window root. `frame` is the window's rectangle on screen.
    pub fn create_window(&mut self, frame: Rect) -> ViewId {
        self.create(ViewKind::Window, frame)
    }

    fn create(&mut self, kind: ViewKind, frame: Rect) -> ViewId {
        let frame = frame.abs();
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.alive[i] = true;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.frame[i] = frame;
            self.content_offset[i] = Vec2::ZERO;
            self.alpha[i] = 1.0;
            self.flags[i] = ViewFlags::default();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.frame.push(frame);
            self.content_offset.push(Vec2::ZERO);
            self.alpha.push(1.0);
            self.flags.push(ViewFlags::default());
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.topology_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        ViewId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a view, freeing its slot for reuse.
    ///
    /// Any tracker still holding the handle will observe it as released.
    ///
    /// # Panics
    ///
    /// Panics if the view has children or if the handle is stale.
    pub fn destroy_view(&mut self, id: ViewId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy view with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;

        self.free_list.push(idx);
        self.topology_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    // -- Topology API --

    /// Adds `child` as the topmost (last) child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, if
    /// `child` is a window, or if `parent` is `child` or inside its subtree.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        self.validate(parent);
        self.validate(child);
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            self.kind[c as usize] != ViewKind::Window,
            "windows are always roots"
        );
        self.assert_acyclic(parent.idx, c);
        self.link_last(parent.idx, c);
    }

    /// Inserts `child` directly beneath `sibling` in drawing order.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent or is a
    /// window, `sibling` has no parent, or `sibling` is inside `child`'s
    /// subtree.
    pub fn insert_before(&mut self, child: ViewId, sibling: ViewId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            self.kind[c as usize] != ViewKind::Window,
            "windows are always roots"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.assert_acyclic(p, c);

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];
        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.attach_dependencies(c, p);
    }

    /// Detaches `child` from its parent. The subtree stays alive but is no
    /// longer on screen.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the view has no parent.
    pub fn remove_from_parent(&mut self, child: ViewId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "view has no parent");
        self.detach(c);
    }

    /// Moves `child` to be the topmost child of `new_parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` is a window, or `new_parent`
    /// is `child` or inside its subtree.
    pub fn reparent(&mut self, child: ViewId, new_parent: ViewId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        assert!(
            self.kind[c as usize] != ViewKind::Window,
            "windows are always roots"
        );
        self.assert_acyclic(new_parent.idx, c);
        if self.parent[c as usize] != INVALID {
            self.detach(c);
        }
        self.link_last(new_parent.idx, c);
    }

    /// Returns the parent of a view, if any.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.handle_at(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a view, bottom-most
    /// first.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a view, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: ViewId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Returns the window a view is attached to, if its root is a window.
    ///
    /// A window is its own window.
    #[must_use]
    pub fn window_of(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.window_index_of(id.idx)
            .and_then(|idx| self.handle_at(idx))
    }

    // -- Property getters --

    /// Returns the kind of a view.
    #[must_use]
    pub fn kind(&self, id: ViewId) -> ViewKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the frame of a view in its parent's content coordinates.
    #[must_use]
    pub fn frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.frame[id.idx as usize]
    }

    /// Returns the content offset (bounds origin) of a view.
    #[must_use]
    pub fn content_offset(&self, id: ViewId) -> Vec2 {
        self.validate(id);
        self.content_offset[id.idx as usize]
    }

    /// Returns the alpha of a view.
    #[must_use]
    pub fn alpha(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.alpha[id.idx as usize]
    }

    /// Returns the flags of a view.
    #[must_use]
    pub fn flags(&self, id: ViewId) -> ViewFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the frame of a view. Negative-size rectangles are normalized.
    ///
    /// Marks LAYOUT locally and GEOMETRY for the whole subtree.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) {
        self.validate(id);
        self.frame[id.idx as usize] = frame.abs();
        self.dirty.mark(id.idx, dirty::LAYOUT);
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Scrolls a view's content so that `offset` is at its top-left corner.
    ///
    /// Marks SCROLL locally and GEOMETRY for the whole subtree.
    pub fn set_content_offset(&mut self, id: ViewId, offset: Vec2) {
        self.validate(id);
        if self.content_offset[id.idx as usize] == offset {
            return;
        }
        self.content_offset[id.idx as usize] = offset;
        self.dirty.mark(id.idx, dirty::SCROLL);
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the alpha of a view.
    pub fn set_alpha(&mut self, id: ViewId, alpha: f64) {
        self.validate(id);
        self.alpha[id.idx as usize] = alpha;
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Sets the flags of a view.
    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    // -- Raw-index helpers --

    /// Returns the window slot at the root of `idx`'s ancestor chain.
    pub(crate) fn window_index_of(&self, idx: u32) -> Option<u32> {
        if idx >= self.len || !self.alive[idx as usize] {
            return None;
        }
        let mut root = idx;
        while self.parent[root as usize] != INVALID {
            root = self.parent[root as usize];
        }
        (self.kind[root as usize] == ViewKind::Window).then_some(root)
    }

    /// Like [`window_index_of`](Self::window_index_of), but memoizes the root
    /// of every slot it walks through in `cache`.
    ///
    /// The cache is only valid while the topology is unchanged; call
    /// [`WindowCache::reset`] before each batch.
    pub(crate) fn window_index_cached(&self, idx: u32, cache: &mut WindowCache) -> Option<u32> {
        if idx >= self.len || !self.alive[idx as usize] {
            return None;
        }
        if cache.root.len() < self.len as usize {
            cache.root.resize(self.len as usize, INVALID);
        }
        cache.path.clear();
        let mut cur = idx;
        let root = loop {
            let known = cache.root[cur as usize];
            if known != INVALID {
                break known;
            }
            cache.path.push(cur);
            let parent = self.parent[cur as usize];
            if parent == INVALID {
                break cur;
            }
            cur = parent;
        };
        for &i in &cache.path {
            cache.root[i as usize] = root;
        }
        (self.kind[root as usize] == ViewKind::Window).then_some(root)
    }

    /// Builds a handle for a live slot, or `None` for [`INVALID`].
    pub(crate) fn handle_at(&self, idx: u32) -> Option<ViewId> {
        (idx != INVALID).then(|| ViewId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ViewId) {
        assert!(
            self.is_alive(id),
            "stale ViewId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Panics if `c` is `p` or one of its ancestors.
    fn assert_acyclic(&self, p: u32, c: u32) {
        let mut cur = p;
        while cur != INVALID {
            assert!(cur != c, "attaching view {c} under {p} would create a cycle");
            cur = self.parent[cur as usize];
        }
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.attach_dependencies(c, p);
    }

    fn attach_dependencies(&mut self, c: u32, p: u32) {
        // Parent links were checked for cycles before linking.
        let geometry = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let visibility = self.dirty.add_dependency(c, p, dirty::VISIBILITY);
        debug_assert!(
            geometry.is_ok() && visibility.is_ok(),
            "dirty dependencies diverged from parent links"
        );
        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::GEOMETRY);
        self.dirty.remove_dependency(c, p, dirty::VISIBILITY);
        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
    }
}
