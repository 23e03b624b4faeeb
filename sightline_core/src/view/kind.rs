// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View kinds and per-view flags.

/// What role a view plays in the hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// An ordinary view. Clips its subtree only when
    /// [`ViewFlags::clips_to_bounds`] is set.
    #[default]
    Plain,
    /// A scrollable container. Its content offset shifts every descendant,
    /// and it always clips to its bounds.
    Scroll,
    /// A root that maps onto the device screen. Its frame is in screen
    /// coordinates and acts as the viewport for everything beneath it.
    Window,
}

impl ViewKind {
    /// Whether views of this kind clip their subtree regardless of flags.
    #[inline]
    #[must_use]
    pub const fn always_clips(self) -> bool {
        matches!(self, Self::Scroll | Self::Window)
    }
}

/// Per-view boolean flags.
///
/// `hidden` suppresses the view and its subtree from exposure. `opaque`
/// marks a view whose rectangle fully covers whatever is drawn beneath it, so
/// it counts as an obstruction when it sits above a tracked view.
/// Transparent views never obstruct on their own, only through their opaque
/// descendants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewFlags {
    /// Whether the view (and its subtree) is hidden.
    pub hidden: bool,
    /// Whether the view paints an opaque background.
    pub opaque: bool,
    /// Whether the view clips its subtree to its bounds.
    pub clips_to_bounds: bool,
}
