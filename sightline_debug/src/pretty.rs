// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to milliseconds using a [`Timebase`].

use std::io::Write;

use sightline_core::time::{HostTime, Timebase};
use sightline_core::trace::{
    DebounceEvent, EvaluationEvent, EvaluationOutcome, ObstructionEvent, SignalEvent,
    StateChangeEvent, TouchEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ms(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_nanos(t.ticks()) as f64 / 1_000_000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] {:.1}ms {:?} -> {:?} target={:?}",
            self.ms(e.at),
            e.from,
            e.to,
            e.target,
        );
    }

    fn on_signal(&mut self, e: &SignalEvent) {
        let mode = if e.trigger.immediate {
            "immediate"
        } else {
            "debounced"
        };
        let _ = writeln!(
            self.writer,
            "[signal] {:.1}ms {:?} ({mode}) target={:?}",
            self.ms(e.at),
            e.trigger.reason,
            e.target,
        );
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        let suspended = if e.suspended { " SUSPENDED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[touch] {:.1}ms {:?}{suspended}",
            self.ms(e.at),
            e.phase,
        );
    }

    fn on_debounce(&mut self, e: &DebounceEvent) {
        let verb = if e.replaced { "pushed to" } else { "due" };
        let _ = writeln!(
            self.writer,
            "[debounce] {:.1}ms {:?} {verb} {:.1}ms",
            self.ms(e.at),
            e.reason,
            self.ms(e.deadline),
        );
    }

    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        let outcome = match e.outcome {
            EvaluationOutcome::Changed => "changed".to_owned(),
            EvaluationOutcome::Unchanged => "unchanged".to_owned(),
            EvaluationOutcome::Failed(err) => format!("FAILED: {err}"),
        };
        let fraction = e
            .fraction
            .map_or_else(|| "-".to_owned(), |f| format!("{:.1}%", f * 100.0));
        let _ = writeln!(
            self.writer,
            "[eval] {:.1}ms {:?} exposure={fraction} {outcome}",
            self.ms(e.at),
            e.reason,
        );
    }

    fn on_obstructions(&mut self, e: &ObstructionEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[obstruct] {:.1}ms rects={}",
            self.ms(e.at),
            e.rects.len(),
        );
    }
}
