// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Why an exposure could not be measured.
///
/// Both cases are recoverable: a tracker reports the error to its handler
/// and keeps observing, so a view that is re-attached later is picked up
/// again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryError {
    /// The view is alive but its root is not a window, so it has no screen
    /// coordinate space.
    Detached,
    /// The view was destroyed; the tracker's handle is stale.
    TargetReleased,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "view is not attached to a window"),
            Self::TargetReleased => write!(f, "view has been destroyed"),
        }
    }
}

impl core::error::Error for GeometryError {}
