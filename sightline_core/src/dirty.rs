// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the view tree.
//!
//! Each channel is an independent category of hierarchy change, tracked with
//! [`understory_dirty`].
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`GEOMETRY`] and [`VISIBILITY`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency edges
//!   from child to parent. A view's on-screen rectangle depends on every
//!   ancestor's frame and scroll offset, and its effective visibility depends
//!   on every ancestor's hidden flag and alpha, so marking an ancestor marks
//!   the whole subtree. This is what lets a scroll container's offset change
//!   reach a deeply nested tracked view without any per-view subscription.
//!
//! - **Local-only**: [`SCROLL`] and [`LAYOUT`] record which view was
//!   directly mutated (scroll offset, own frame). Event sources use them to
//!   tell a scroll signal from a window resize.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on attach/detach/create/destroy.
//!
//! # Consumption
//!
//! [`ViewTree::evaluate`](crate::view::ViewTree::evaluate) drains every
//! channel into [`ViewChanges`](crate::view::ViewChanges).

use understory_dirty::Channel;

/// World rectangle may have moved: own frame, an ancestor frame, or an
/// ancestor scroll offset changed.
pub const GEOMETRY: Channel = Channel::new(0);

/// Effective visibility may have changed: hidden flag, alpha, or clipping.
pub const VISIBILITY: Channel = Channel::new(1);

/// Scroll offset (bounds origin) of this view changed.
pub const SCROLL: Channel = Channel::new(2);

/// Frame of this view changed.
pub const LAYOUT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
