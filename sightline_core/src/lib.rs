// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View hierarchy model and scroll-driven exposure tracking.
//!
//! `sightline_core` answers one question for a host UI: how much of a given
//! view is actually on screen right now, and when does that change? It is
//! `no_std` compatible (with `alloc`), never reads a clock and never spawns
//! work; the host drives everything from its own event loop.
//!
//! # Architecture
//!
//! ```text
//!   host mutates ViewTree
//!       │
//!       ▼
//!   ViewTree::evaluate() ──► ViewChanges
//!                                 │
//!                                 ▼
//!              ExposureEventSource::on_view_changes() ──► Trigger
//!                                                            │
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   Debounce ──(deadline)──► exposure::evaluate() ──► ExposureState
//!                                                            │
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   ExposureChecker (compare with last delivery) ──► handler
//! ```
//!
//! **[`view`]**: Struct-of-arrays view tree with generational handles.
//! Frames, scroll offsets, alpha and flags are set by the host.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//! GEOMETRY and VISIBILITY propagate to descendants, so scrolling a
//! container reaches every view inside it; SCROLL and LAYOUT are local;
//! TOPOLOGY records structural changes.
//!
//! **[`exposure`]**: Visible fraction, visible rectangle and obstruction
//! regions for one view.
//!
//! **[`source`]**: The [`ExposureEventSource`](source::ExposureEventSource)
//! trait with a scroll-driven and a timer-polling strategy.
//!
//! **[`debounce`]**: Trailing-edge debouncing on host time.
//!
//! **[`checker`]**: The [`ExposureChecker`](checker::ExposureChecker) state
//! machine that ties the pieces together.
//!
//! **[`time`]**: Host ticks, durations and tick/nanosecond conversion.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! tracker instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use kurbo::{Rect, Vec2};
//! use sightline_core::checker::{ExposureChecker, ExposureConfig};
//! use sightline_core::time::HostTime;
//! use sightline_core::view::ViewTree;
//!
//! let mut tree = ViewTree::new();
//! let window = tree.create_window(Rect::new(0.0, 0.0, 320.0, 480.0));
//! let feed = tree.create_scroll_view(Rect::new(0.0, 0.0, 320.0, 480.0));
//! let ad = tree.create_view(Rect::new(0.0, 0.0, 320.0, 100.0));
//! tree.add_child(window, feed);
//! tree.add_child(feed, ad);
//! let _ = tree.evaluate();
//!
//! let mut checker = ExposureChecker::new(ExposureConfig::nanos());
//! checker.start(&tree, ad, |update| {
//!     if let Ok(state) = update {
//!         assert!(state.fraction > 0.0);
//!     }
//! }, HostTime(0));
//!
//! tree.set_content_offset(feed, Vec2::new(0.0, 40.0));
//! let changes = tree.evaluate();
//! checker.handle_changes(&tree, &changes, HostTime(1_000_000));
//!
//! let due = checker.next_deadline().unwrap();
//! assert_eq!(due, HostTime(101_000_000));
//! checker.poll(&tree, due);
//! assert!((checker.last_exposure().unwrap().fraction - 0.6).abs() < 1e-9);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates obstruction
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod checker;
pub mod debounce;
pub mod dirty;
pub mod exposure;
pub mod source;
pub mod time;
pub mod trace;
pub mod view;
