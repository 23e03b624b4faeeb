// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View hierarchy data model.
//!
//! A *view* is a node in an on-screen hierarchy. Each view has:
//!
//! - An identity ([`ViewId`]): a generational, non-owning handle that goes
//!   stale when the view is destroyed.
//! - Topology: parent, first-child, and sibling links. Later siblings are
//!   drawn above earlier ones.
//! - A [`ViewKind`]: plain view, scroll container, or window root.
//! - Properties set by the host: [`frame`](ViewTree::set_frame) (in the
//!   parent's content coordinates), [`content
//!   offset`](ViewTree::set_content_offset) (the scroll position),
//!   [`alpha`](ViewTree::set_alpha), and [`flags`](ViewTree::set_flags).
//!
//! Views are stored in struct-of-arrays layout with index-based handles.
//!
//! # Change signals
//!
//! Property mutations mark dirty channels (see [`dirty`](crate::dirty)), and
//! [`ViewTree::evaluate`] drains them into [`ViewChanges`]. Exposure event
//! sources read those changes instead of registering per-view observers.

mod evaluate;
mod id;
mod kind;
mod store;
mod traverse;

pub use evaluate::ViewChanges;
pub use id::{INVALID, ViewId};
pub use kind::{ViewFlags, ViewKind};
pub use store::ViewTree;
pub(crate) use store::WindowCache;
pub use traverse::{Ancestors, Children};
