// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identity.

use core::fmt;

/// Sentinel value meaning "no view" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A non-owning handle to a view in a [`ViewTree`](super::ViewTree).
///
/// The handle carries a slot index and a generation counter. Destroying the
/// view bumps the slot's generation, so a handle held by a tracker goes stale
/// instead of silently pointing at whatever view reuses the slot. Holding a
/// `ViewId` never keeps the view alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ViewId {
    /// Rebuilds a handle from its raw parts, as read back from a trace
    /// recording.
    ///
    /// The result is only alive if a view with exactly this slot and
    /// generation still exists.
    #[inline]
    #[must_use]
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self {
            idx: index,
            generation,
        }
    }

    /// Returns the raw slot index, as it appears in
    /// [`ViewChanges`](super::ViewChanges).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}
