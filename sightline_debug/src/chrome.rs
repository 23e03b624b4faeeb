// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each tracked view gets its own track (`tid` is the view's slot index).
//! Tracking states become duration slices, the debounce window of every
//! scheduled evaluation becomes a complete event, and signals, touches and
//! evaluations become instants. Exposure fractions are also emitted as a
//! counter so the timeline shows a graph of visibility over time.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use sightline_core::checker::TrackingState;
use sightline_core::time::Timebase;
use sightline_core::trace::EvaluationOutcome;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::StateChange(e) => {
                let ts = ticks_to_us(e.at.ticks(), timebase);
                let tid = e.target.map_or(0, |t| t.index());
                if e.from.is_active() {
                    events.push(json!({
                        "ph": "E",
                        "name": state_name(e.from),
                        "cat": "State",
                        "ts": ts,
                        "pid": 0,
                        "tid": tid,
                    }));
                }
                if e.to.is_active() {
                    events.push(json!({
                        "ph": "B",
                        "name": state_name(e.to),
                        "cat": "State",
                        "ts": ts,
                        "pid": 0,
                        "tid": tid,
                    }));
                }
            }
            RecordedEvent::Signal(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.trigger.reason),
                    "cat": "Signal",
                    "ts": ticks_to_us(e.at.ticks(), timebase),
                    "pid": 0,
                    "tid": e.target.index(),
                    "s": "t",
                    "args": {
                        "immediate": e.trigger.immediate,
                    }
                }));
            }
            RecordedEvent::Touch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Touch{:?}", e.phase),
                    "cat": "Touch",
                    "ts": ticks_to_us(e.at.ticks(), timebase),
                    "pid": 0,
                    "tid": e.target.index(),
                    "s": "g",
                    "args": {
                        "suspended": e.suspended,
                    }
                }));
            }
            RecordedEvent::Debounce(e) => {
                let start = ticks_to_us(e.at.ticks(), timebase);
                let end = ticks_to_us(e.deadline.ticks(), timebase);
                events.push(json!({
                    "ph": "X",
                    "name": "Debounce",
                    "cat": "Debounce",
                    "ts": start,
                    "dur": end - start,
                    "pid": 0,
                    "tid": e.target.index(),
                    "args": {
                        "reason": format!("{:?}", e.reason),
                        "replaced": e.replaced,
                    }
                }));
            }
            RecordedEvent::Evaluation(e) => {
                let ts = ticks_to_us(e.at.ticks(), timebase);
                let outcome = match e.outcome {
                    EvaluationOutcome::Changed => "changed".to_owned(),
                    EvaluationOutcome::Unchanged => "unchanged".to_owned(),
                    EvaluationOutcome::Failed(err) => err.to_string(),
                };
                events.push(json!({
                    "ph": "i",
                    "name": "Evaluate",
                    "cat": "Exposure",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.target.index(),
                    "s": "t",
                    "args": {
                        "reason": format!("{:?}", e.reason),
                        "outcome": outcome,
                        "fraction": e.fraction,
                    }
                }));
                if let Some(fraction) = e.fraction {
                    events.push(json!({
                        "ph": "C",
                        "name": format!("exposure[{}]", e.target.index()),
                        "cat": "Exposure",
                        "ts": ts,
                        "pid": 0,
                        "args": {
                            "fraction": fraction,
                        }
                    }));
                }
            }
            RecordedEvent::ObstructionsCount { target, count, at } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Obstructions",
                    "cat": "Rich",
                    "ts": ticks_to_us(at.ticks(), timebase),
                    "pid": 0,
                    "tid": target.index(),
                    "s": "t",
                    "args": {
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn state_name(state: TrackingState) -> &'static str {
    match state {
        TrackingState::Idle => "Idle",
        TrackingState::Observing => "Observing",
        TrackingState::Suspended => "Suspended",
        TrackingState::Stopped => "Stopped",
    }
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
