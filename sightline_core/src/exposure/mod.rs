// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exposure geometry.
//!
//! [`evaluate`] turns the current state of a [`ViewTree`](crate::view::ViewTree)
//! into an [`ExposureState`] for one target view: how much of it is on
//! screen after ancestor clipping, the window viewport, and obstruction by
//! opaque views drawn above it.
//!
//! Evaluation is a pure read of the tree. It never caches and never touches
//! dirty state, so it can be called at any time, including from inside a
//! handler.

mod error;
mod evaluate;
mod region;
mod state;

pub use error::GeometryError;
pub use evaluate::evaluate;
pub use state::ExposureState;
