// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated feed scroll that exercises exposure tracking and diagnostics.
//!
//! A 390x844 window shows a scrolling feed with an ad in its third cell and
//! an opaque header pinned above the feed. The simulation drags the feed
//! with a finger, lets it coast to a stop, and tracks the ad with two
//! checkers side by side:
//!
//! - a scroll-driven checker, traced to a
//!   [`PrettyPrintSink`](sightline_debug::pretty::PrettyPrintSink) and a
//!   [`RecorderSink`](sightline_debug::recorder::RecorderSink);
//! - a polling checker that pauses while the finger is down.
//!
//! The recording is exported as a Chrome trace JSON file at the end.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Rect, Vec2};
use sightline_core::checker::{ExposureChecker, ExposureConfig, ExposureUpdate};
use sightline_core::source::{ExposureEventSource, PollingConfig, PollingSource, TouchPhase};
use sightline_core::time::{HostTime, Timebase};
use sightline_core::trace::{
    DebounceEvent, EvaluationEvent, ObstructionEvent, SignalEvent, StateChangeEvent, TouchEvent,
    TraceSink,
};
use sightline_core::view::{ViewChanges, ViewFlags, ViewTree};

use sightline_debug::pretty::PrettyPrintSink;
use sightline_debug::recorder::RecorderSink;

/// Host loop period (≈60 Hz).
const FRAME_MS: u64 = 16;
const TOUCH_DOWN_MS: u64 = 200;
const TOUCH_UP_MS: u64 = 700;
const SETTLED_MS: u64 = 1_100;
const END_MS: u64 = 1_600;

const CELL_HEIGHT: f64 = 300.0;
const AD_CELL: u32 = 2;

/// Forwards every event to a pretty printer and a recorder.
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.pretty.on_state_change(e);
        self.recorder.on_state_change(e);
    }

    fn on_signal(&mut self, e: &SignalEvent) {
        self.pretty.on_signal(e);
        self.recorder.on_signal(e);
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        self.pretty.on_touch(e);
        self.recorder.on_touch(e);
    }

    fn on_debounce(&mut self, e: &DebounceEvent) {
        self.pretty.on_debounce(e);
        self.recorder.on_debounce(e);
    }

    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        self.pretty.on_evaluation(e);
        self.recorder.on_evaluation(e);
    }

    fn on_obstructions(&mut self, e: &ObstructionEvent<'_>) {
        self.pretty.on_obstructions(e);
        self.recorder.on_obstructions(e);
    }
}

/// Scroll offset of the feed at `ms`: a linear drag while the finger is
/// down, then an ease-out coast.
fn offset_at(ms: u64) -> f64 {
    if ms <= TOUCH_DOWN_MS {
        0.0
    } else if ms <= TOUCH_UP_MS {
        500.0 * (ms - TOUCH_DOWN_MS) as f64 / (TOUCH_UP_MS - TOUCH_DOWN_MS) as f64
    } else if ms <= SETTLED_MS {
        let t = (ms - TOUCH_UP_MS) as f64 / (SETTLED_MS - TOUCH_UP_MS) as f64;
        500.0 + 150.0 * (1.0 - (1.0 - t).powi(2))
    } else {
        650.0
    }
}

fn report(label: &'static str) -> impl FnMut(ExposureUpdate<'_>) + 'static {
    move |update| match update {
        Ok(state) => println!(
            "{label:>7} >> exposure {:5.1}% visible={:?} obstructions={}",
            state.fraction * 100.0,
            state.visible_rect,
            state.obstructions.len(),
        ),
        Err(err) => println!("{label:>7} >> {err}"),
    }
}

/// Polls `checker` for as long as it has work due at `now`.
fn pump<S: ExposureEventSource>(checker: &mut ExposureChecker<S>, tree: &ViewTree, now: HostTime) {
    while checker.next_deadline().is_some_and(|due| due <= now) {
        checker.poll(tree, now);
    }
}

fn main() {
    let timebase = Timebase::NANOS;
    let at_ms = |ms: u64| HostTime(ms * 1_000_000);

    // -- hierarchy ---------------------------------------------------------
    let mut tree = ViewTree::new();
    let window = tree.create_window(Rect::new(0.0, 0.0, 390.0, 844.0));
    let feed = tree.create_scroll_view(Rect::new(0.0, 0.0, 390.0, 844.0));
    tree.add_child(window, feed);

    let mut ad = None;
    for i in 0..12_u32 {
        let y = f64::from(i) * CELL_HEIGHT;
        let cell = tree.create_view(Rect::new(0.0, y, 390.0, y + CELL_HEIGHT));
        tree.add_child(feed, cell);
        if i == AD_CELL {
            let view = tree.create_view(Rect::new(20.0, 25.0, 370.0, 275.0));
            tree.add_child(cell, view);
            ad = Some(view);
        }
    }
    let Some(ad) = ad else {
        unreachable!("the feed always has an ad cell");
    };

    let header = tree.create_view(Rect::new(0.0, 0.0, 390.0, 60.0));
    tree.set_flags(
        header,
        ViewFlags {
            opaque: true,
            ..ViewFlags::default()
        },
    );
    tree.add_child(window, header);
    let _ = tree.evaluate();

    // -- checkers ----------------------------------------------------------
    let recorder = RecorderSink::new();
    let mut scroll = ExposureChecker::new(ExposureConfig::new(timebase));
    scroll.set_trace_sink(Box::new(Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        recorder: recorder.clone(),
    }));
    let mut polling = ExposureChecker::with_source(
        ExposureConfig::new(timebase),
        PollingSource::new(PollingConfig::new(timebase)),
    );

    scroll.start(&tree, ad, report("scroll"), at_ms(0));
    polling.start(&tree, ad, report("polling"), at_ms(0));

    // -- simulated loop ----------------------------------------------------
    let mut changes = ViewChanges::default();
    let mut touching = false;
    let mut ms = 0;
    while ms <= END_MS {
        let now = at_ms(ms);

        let finger_down = (TOUCH_DOWN_MS..TOUCH_UP_MS).contains(&ms);
        if finger_down != touching {
            touching = finger_down;
            let phase = if touching {
                TouchPhase::Began
            } else {
                TouchPhase::Ended
            };
            scroll.handle_touch(&tree, phase, now);
            polling.handle_touch(&tree, phase, now);
        }

        tree.set_content_offset(feed, Vec2::new(0.0, offset_at(ms)));
        tree.evaluate_into(&mut changes);
        scroll.handle_changes(&tree, &changes, now);
        polling.handle_changes(&tree, &changes, now);

        pump(&mut scroll, &tree, now);
        pump(&mut polling, &tree, now);

        ms += FRAME_MS;
    }

    scroll.stop();
    polling.stop();

    // -- export Chrome trace -----------------------------------------------
    let path = "exposure_trace.json";
    let file = File::create(path).expect("failed to create exposure_trace.json");
    let mut writer = BufWriter::new(file);
    sightline_debug::chrome::export(&recorder.bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} bytes recorded)", recorder.len());
}
