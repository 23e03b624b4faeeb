// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for exposure tracking.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`ExposureChecker`](crate::checker::ExposureChecker) calls as it moves
//! between states, receives signals, schedules debounced work and evaluates.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ObstructionEvent`] and the
//!   corresponding `TraceSink` method.

use crate::checker::TrackingState;
use crate::exposure::GeometryError;
use crate::source::{TouchPhase, Trigger, TriggerReason};
use crate::time::HostTime;
use crate::view::ViewId;

#[cfg(feature = "trace-rich")]
use kurbo::Rect;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Result of one evaluation, as seen by the checker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvaluationOutcome {
    /// A new exposure was delivered to the handler.
    Changed,
    /// The exposure matched the last delivery; the handler was not called.
    Unchanged,
    /// Evaluation failed.
    Failed(GeometryError),
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted on every tracking-state transition.
#[derive(Clone, Copy, Debug)]
pub struct StateChangeEvent {
    /// The tracked view, if one is still held.
    pub target: Option<ViewId>,
    /// State before the transition.
    pub from: TrackingState,
    /// State after the transition.
    pub to: TrackingState,
    /// Host time of the transition.
    pub at: HostTime,
}

/// Emitted when the event source produces a trigger.
#[derive(Clone, Copy, Debug)]
pub struct SignalEvent {
    /// The tracked view.
    pub target: ViewId,
    /// The trigger.
    pub trigger: Trigger,
    /// Host time the signal was received.
    pub at: HostTime,
}

/// Emitted when the host reports a touch phase.
#[derive(Clone, Copy, Debug)]
pub struct TouchEvent {
    /// The tracked view.
    pub target: ViewId,
    /// Which phase.
    pub phase: TouchPhase,
    /// Whether the source is suspended after handling the phase.
    pub suspended: bool,
    /// Host time of the touch.
    pub at: HostTime,
}

/// Emitted when an evaluation is scheduled through the debounce slot.
#[derive(Clone, Copy, Debug)]
pub struct DebounceEvent {
    /// The tracked view.
    pub target: ViewId,
    /// Reason carried by the pending evaluation.
    pub reason: TriggerReason,
    /// When the evaluation becomes due.
    pub deadline: HostTime,
    /// Whether an already pending evaluation was pushed back.
    pub replaced: bool,
    /// Host time of scheduling.
    pub at: HostTime,
}

/// Emitted after every evaluation.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationEvent {
    /// The tracked view.
    pub target: ViewId,
    /// Why the evaluation ran.
    pub reason: TriggerReason,
    /// What happened.
    pub outcome: EvaluationOutcome,
    /// Measured fraction, if evaluation succeeded.
    pub fraction: Option<f64>,
    /// Host time of evaluation.
    pub at: HostTime,
}

/// Obstructions found by a successful evaluation.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ObstructionEvent<'a> {
    /// The tracked view.
    pub target: ViewId,
    /// Visible rectangle the obstructions were clipped to.
    pub visible_rect: Rect,
    /// Obstruction rectangles in screen coordinates.
    pub rects: &'a [Rect],
    /// Host time of evaluation.
    pub at: HostTime,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from an exposure checker.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called on every tracking-state transition.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called when the event source produces a trigger.
    fn on_signal(&mut self, e: &SignalEvent) {
        _ = e;
    }

    /// Called when a touch phase is received.
    fn on_touch(&mut self, e: &TouchEvent) {
        _ = e;
    }

    /// Called when an evaluation is debounced.
    fn on_debounce(&mut self, e: &DebounceEvent) {
        _ = e;
    }

    /// Called after every evaluation.
    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        _ = e;
    }

    /// Called with the obstructions found by an evaluation (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_obstructions(&mut self, e: &ObstructionEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`StateChangeEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &StateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SignalEvent`].
    #[inline]
    pub fn signal(&mut self, e: &SignalEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_signal(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TouchEvent`].
    #[inline]
    pub fn touch(&mut self, e: &TouchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_touch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DebounceEvent`].
    #[inline]
    pub fn debounce(&mut self, e: &DebounceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_debounce(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EvaluationEvent`].
    #[inline]
    pub fn evaluation(&mut self, e: &EvaluationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluation(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ObstructionEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn obstructions(&mut self, e: &ObstructionEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_obstructions(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
