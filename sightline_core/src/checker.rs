// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The exposure-tracking state machine.
//!
//! An [`ExposureChecker`] follows one target view and tells a handler
//! whenever the target's exposure changes:
//!
//! ```text
//!   Idle ──start──► Observing ◄──touch end──┐
//!                      │  ▲                  │
//!                      │  └──────────────────┤
//!                      │            touch begin (polling, paused)
//!                      │                     ▼
//!                      │                 Suspended
//!                      │                     │
//!                      └──────stop───────────┴──► Stopped
//! ```
//!
//! The host drives the checker from its own loop. After mutating the
//! [`ViewTree`] it calls [`ViewTree::evaluate`] once and passes the
//! resulting [`ViewChanges`] to [`handle_changes`](ExposureChecker::handle_changes);
//! touch phases go to [`handle_touch`](ExposureChecker::handle_touch); and
//! whenever [`next_deadline`](ExposureChecker::next_deadline) passes it calls
//! [`poll`](ExposureChecker::poll). The event source decides which of those
//! signals warrant a re-measurement, the debounce slot coalesces bursts, and
//! the handler only hears about results that differ from the last one it
//! was given.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::debounce::Debounce;
use crate::exposure::{self, ExposureState, GeometryError};
use crate::source::{
    ExposureEventSource, ScrollSource, Subscription, TouchEndPolicy, TouchPhase, Trigger,
    TriggerReason,
};
use crate::time::{Duration, HostTime, Timebase};
use crate::trace::{
    DebounceEvent, EvaluationEvent, EvaluationOutcome, SignalEvent, StateChangeEvent, TouchEvent,
    TraceSink, Tracer,
};
use crate::view::{ViewChanges, ViewId, ViewTree};

/// What a handler receives: a fresh exposure or the reason none could be
/// measured.
pub type ExposureUpdate<'a> = Result<&'a ExposureState, &'a GeometryError>;

type Handler = Box<dyn FnMut(ExposureUpdate<'_>)>;

/// Lifecycle of an [`ExposureChecker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// Created, not yet started.
    #[default]
    Idle,
    /// Subscribed and delivering updates.
    Observing,
    /// Subscribed, but the event source is withholding triggers.
    Suspended,
    /// Torn down. Terminal.
    Stopped,
}

impl TrackingState {
    /// Whether the checker holds a subscription in this state.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Observing | Self::Suspended)
    }
}

/// Configuration for an [`ExposureChecker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExposureConfig {
    /// Quiet period after the last signal before an evaluation runs.
    pub debounce_interval: Duration,
    /// How the default [`ScrollSource`] treats the end of a touch.
    pub touch_end: TouchEndPolicy,
}

impl ExposureConfig {
    /// Default configuration: a 100 ms debounce and a debounced
    /// re-evaluation when a touch ends.
    #[must_use]
    pub const fn new(timebase: Timebase) -> Self {
        Self {
            debounce_interval: Duration::from_millis(100, timebase),
            touch_end: TouchEndPolicy::Debounced,
        }
    }

    /// Default configuration for hosts whose ticks are nanoseconds.
    #[must_use]
    pub const fn nanos() -> Self {
        Self::new(Timebase::NANOS)
    }
}

/// Requests that an [`ExposureChecker`] stop.
///
/// A handler cannot borrow the checker that is calling it. Instead it can
/// hold a `StopHandle` and call [`stop`](Self::stop); the checker tears down
/// as soon as the handler returns, and no further updates are delivered.
#[derive(Clone, Debug)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    /// Requests teardown.
    pub fn stop(&self) {
        self.0.set(true);
    }

    /// Whether teardown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Delivered {
    Nothing,
    State,
    Error(GeometryError),
}

/// Tracks the exposure of one view.
///
/// Generic over the [`ExposureEventSource`] strategy; the default
/// [`ScrollSource`] re-measures on scroll and layout signals and keeps
/// tracking during touches.
pub struct ExposureChecker<S = ScrollSource> {
    config: ExposureConfig,
    source: S,
    state: TrackingState,
    target: Option<ViewId>,
    handler: Option<Handler>,
    pending: Debounce<TriggerReason>,
    last_good: Option<ExposureState>,
    last_delivered: Delivered,
    stop_requested: Rc<Cell<bool>>,
    clock: HostTime,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl<S: fmt::Debug> fmt::Debug for ExposureChecker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureChecker")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("pending", &self.pending)
            .field("last_good", &self.last_good)
            .finish_non_exhaustive()
    }
}

impl ExposureChecker {
    /// Creates an idle checker using a [`ScrollSource`].
    #[must_use]
    pub fn new(config: ExposureConfig) -> Self {
        Self::with_source(config, ScrollSource::new(config.touch_end))
    }
}

impl<S: ExposureEventSource> ExposureChecker<S> {
    /// Creates an idle checker using the given event source.
    #[must_use]
    pub fn with_source(config: ExposureConfig, source: S) -> Self {
        Self {
            config,
            source,
            state: TrackingState::Idle,
            target: None,
            handler: None,
            pending: Debounce::new(config.debounce_interval),
            last_good: None,
            last_delivered: Delivered::Nothing,
            stop_requested: Rc::new(Cell::new(false)),
            clock: HostTime(0),
            trace_sink: None,
        }
    }

    /// Installs a trace sink, replacing any previous one.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace_sink = Some(sink);
    }

    /// Starts tracking `target`.
    ///
    /// Subscribes the event source, measures the target once and delivers
    /// that baseline to `handler` before returning. Calling `start` on an
    /// active checker changes nothing and returns the existing subscription;
    /// calling it after [`stop`](Self::stop) returns `None`.
    pub fn start<F>(
        &mut self,
        tree: &ViewTree,
        target: ViewId,
        handler: F,
        now: HostTime,
    ) -> Option<&Subscription>
    where
        F: FnMut(ExposureUpdate<'_>) + 'static,
    {
        self.observe(now);
        self.apply_stop_request();
        match self.state {
            TrackingState::Stopped => return None,
            TrackingState::Observing | TrackingState::Suspended => {
                return self.source.subscription();
            }
            TrackingState::Idle => {}
        }

        self.handler = Some(Box::new(handler));
        self.target = Some(target);
        self.source.subscribe(tree, target, now);
        self.transition(TrackingState::Observing);
        self.evaluate_now(tree, TriggerReason::Start);
        self.apply_stop_request();
        self.source.subscription()
    }

    /// Feeds the signals from one [`ViewTree::evaluate`] call.
    pub fn handle_changes(&mut self, tree: &ViewTree, changes: &ViewChanges, now: HostTime) {
        if !self.begin(now) {
            return;
        }
        if let Some(trigger) = self.source.on_view_changes(tree, changes, now) {
            self.dispatch(tree, trigger);
        }
        self.apply_stop_request();
    }

    /// Feeds a touch phase.
    pub fn handle_touch(&mut self, tree: &ViewTree, phase: TouchPhase, now: HostTime) {
        if !self.begin(now) {
            return;
        }
        let trigger = self.source.on_touch(phase, now);
        let suspended = self.source.is_suspended();
        if let Some(target) = self.target {
            tracer(&mut self.trace_sink).touch(&TouchEvent {
                target,
                phase,
                suspended,
                at: now,
            });
        }
        let next = if suspended {
            TrackingState::Suspended
        } else {
            TrackingState::Observing
        };
        if next != self.state {
            self.transition(next);
        }
        if let Some(trigger) = trigger {
            self.dispatch(tree, trigger);
        }
        self.apply_stop_request();
    }

    /// Runs any debounced evaluation that is due and lets the event source
    /// act on its own timer.
    pub fn poll(&mut self, tree: &ViewTree, now: HostTime) {
        if !self.begin(now) {
            return;
        }
        if let Some(reason) = self.pending.poll(now) {
            self.evaluate_now(tree, reason);
            if self.apply_stop_request() {
                return;
            }
        }
        if let Some(trigger) = self.source.poll(now) {
            self.dispatch(tree, trigger);
        }
        self.apply_stop_request();
    }

    /// When the host should next call [`poll`](Self::poll), if ever.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if !self.state.is_active() {
            return None;
        }
        self.pending
            .deadline()
            .into_iter()
            .chain(self.source.next_deadline())
            .min()
    }

    /// Stops tracking: unsubscribes, cancels any pending evaluation and
    /// drops the handler and the target handle.
    ///
    /// Returns `false` if the checker was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == TrackingState::Stopped {
            return false;
        }
        self.source.unsubscribe();
        self.pending.cancel();
        self.handler = None;
        self.transition(TrackingState::Stopped);
        self.target = None;
        true
    }

    /// A handle that lets a handler stop this checker.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Rc::clone(&self.stop_requested))
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Whether the checker is observing or suspended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// The tracked view, until the checker stops.
    #[must_use]
    pub fn target(&self) -> Option<ViewId> {
        self.target
    }

    /// The most recent successful measurement.
    ///
    /// Failed evaluations leave this untouched.
    #[must_use]
    pub fn last_exposure(&self) -> Option<&ExposureState> {
        self.last_good.as_ref()
    }

    /// The event source's current subscription.
    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.source.subscription()
    }

    /// The event source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The configuration the checker was created with.
    #[must_use]
    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    // -- Internals --

    fn observe(&mut self, now: HostTime) {
        self.clock = self.clock.max(now);
    }

    /// Records `now` and applies a deferred stop. Returns whether the
    /// checker may proceed.
    fn begin(&mut self, now: HostTime) -> bool {
        self.observe(now);
        !self.apply_stop_request() && self.state.is_active()
    }

    /// Stops if a [`StopHandle`] asked for it. Returns whether the checker
    /// is stopped.
    fn apply_stop_request(&mut self) -> bool {
        if self.stop_requested.get() {
            self.stop();
        }
        self.state == TrackingState::Stopped
    }

    fn transition(&mut self, to: TrackingState) {
        let from = self.state;
        self.state = to;
        tracer(&mut self.trace_sink).state_change(&StateChangeEvent {
            target: self.target,
            from,
            to,
            at: self.clock,
        });
    }

    fn dispatch(&mut self, tree: &ViewTree, trigger: Trigger) {
        let Some(target) = self.target else {
            return;
        };
        let now = self.clock;
        tracer(&mut self.trace_sink).signal(&SignalEvent {
            target,
            trigger,
            at: now,
        });
        if trigger.immediate {
            self.pending.cancel();
            self.evaluate_now(tree, trigger.reason);
        } else {
            let replaced = self.pending.schedule(trigger.reason, now);
            tracer(&mut self.trace_sink).debounce(&DebounceEvent {
                target,
                reason: trigger.reason,
                deadline: now.saturating_add(self.pending.interval()),
                replaced,
                at: now,
            });
        }
    }

    fn evaluate_now(&mut self, tree: &ViewTree, reason: TriggerReason) {
        let Some(target) = self.target else {
            return;
        };
        let (outcome, fraction) = match exposure::evaluate(tree, target) {
            Ok(state) => {
                #[cfg(feature = "trace-rich")]
                if !state.obstructions.is_empty() {
                    tracer(&mut self.trace_sink).obstructions(&crate::trace::ObstructionEvent {
                        target,
                        visible_rect: state.visible_rect,
                        rects: &state.obstructions,
                        at: self.clock,
                    });
                }
                let changed = match (&self.last_delivered, &self.last_good) {
                    (Delivered::State, Some(last)) => !last.same_exposure(&state),
                    _ => true,
                };
                if changed {
                    if let Some(handler) = self.handler.as_mut() {
                        handler(Ok(&state));
                    }
                    self.last_delivered = Delivered::State;
                }
                let fraction = state.fraction;
                self.last_good = Some(state);
                let outcome = if changed {
                    EvaluationOutcome::Changed
                } else {
                    EvaluationOutcome::Unchanged
                };
                (outcome, Some(fraction))
            }
            Err(err) => {
                if self.last_delivered != Delivered::Error(err) {
                    if let Some(handler) = self.handler.as_mut() {
                        handler(Err(&err));
                    }
                    self.last_delivered = Delivered::Error(err);
                }
                (EvaluationOutcome::Failed(err), None)
            }
        };
        tracer(&mut self.trace_sink).evaluation(&EvaluationEvent {
            target,
            reason,
            outcome,
            fraction,
            at: self.clock,
        });
    }
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => Tracer::new(sink.as_mut()),
        None => Tracer::none(),
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use kurbo::{Rect, Vec2};

    use super::*;
    use crate::source::{PollingConfig, PollingSource};

    const EPS: f64 = 1e-9;
    const INTERVAL: Duration = Duration(100);

    type Log = Rc<RefCell<Vec<Result<ExposureState, GeometryError>>>>;

    fn recorder() -> (Log, impl FnMut(ExposureUpdate<'_>) + 'static) {
        let log = Log::default();
        let sink = Rc::clone(&log);
        let handler = move |u: ExposureUpdate<'_>| {
            sink.borrow_mut().push(u.cloned().map_err(|e| *e));
        };
        (log, handler)
    }

    fn config() -> ExposureConfig {
        ExposureConfig {
            debounce_interval: INTERVAL,
            touch_end: TouchEndPolicy::Debounced,
        }
    }

    /// A 320x480 window showing a full-screen scroll view whose content
    /// starts with a 320x100 ad.
    struct Feed {
        tree: ViewTree,
        window: ViewId,
        scroll: ViewId,
        ad: ViewId,
    }

    fn feed() -> Feed {
        let mut tree = ViewTree::new();
        let window = tree.create_window(Rect::new(0.0, 0.0, 320.0, 480.0));
        let scroll = tree.create_scroll_view(Rect::new(0.0, 0.0, 320.0, 480.0));
        let ad = tree.create_view(Rect::new(0.0, 0.0, 320.0, 100.0));
        tree.add_child(window, scroll);
        tree.add_child(scroll, ad);
        let _ = tree.evaluate();
        Feed {
            tree,
            window,
            scroll,
            ad,
        }
    }

    impl Feed {
        fn scroll_to<S: ExposureEventSource>(
            &mut self,
            checker: &mut ExposureChecker<S>,
            y: f64,
            now: u64,
        ) {
            self.tree.set_content_offset(self.scroll, Vec2::new(0.0, y));
            self.flush(checker, now);
        }

        fn flush<S: ExposureEventSource>(&mut self, checker: &mut ExposureChecker<S>, now: u64) {
            let changes = self.tree.evaluate();
            checker.handle_changes(&self.tree, &changes, HostTime(now));
        }
    }

    fn fractions(log: &Log) -> Vec<f64> {
        log.borrow()
            .iter()
            .map(|u| u.as_ref().map_or(-1.0, |s| s.fraction))
            .collect()
    }

    #[test]
    fn default_config() {
        let config = ExposureConfig::nanos();
        assert_eq!(config.debounce_interval, Duration(100_000_000));
        assert_eq!(config.touch_end, TouchEndPolicy::Debounced);
    }

    #[test]
    fn start_delivers_baseline() {
        let f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());

        let sub = checker.start(&f.tree, f.ad, handler, HostTime(0)).cloned();
        assert_eq!(sub.and_then(|s| s.window()), Some(f.window));
        assert_eq!(checker.state(), TrackingState::Observing);
        assert_eq!(fractions(&log), [1.0]);
        assert_eq!(checker.target(), Some(f.ad));
        assert_eq!(checker.next_deadline(), None);
    }

    #[test]
    fn rapid_scroll_settles_into_one_notification() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        for (i, y) in [10.0, 20.0, 30.0, 40.0].into_iter().enumerate() {
            f.scroll_to(&mut checker, y, 10 * (i as u64 + 1));
        }
        assert_eq!(checker.next_deadline(), Some(HostTime(140)));

        checker.poll(&f.tree, HostTime(139));
        assert_eq!(log.borrow().len(), 1);
        checker.poll(&f.tree, HostTime(140));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        let state = log[1].as_ref().unwrap();
        assert!((state.fraction - 0.6).abs() < EPS, "got {}", state.fraction);
        assert_eq!(state.visible_rect, Rect::new(0.0, 0.0, 320.0, 60.0));
    }

    #[test]
    fn unchanged_exposure_is_not_redelivered() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        // Scroll away and back before the debounce settles.
        f.scroll_to(&mut checker, 50.0, 10);
        f.scroll_to(&mut checker, 0.0, 20);
        checker.poll(&f.tree, HostTime(500));
        assert_eq!(fractions(&log), [1.0]);

        // A visibility signal that does not change what is on screen.
        f.tree.set_alpha(f.scroll, 0.5);
        f.flush(&mut checker, 600);
        assert!(checker.next_deadline().is_some());
        checker.poll(&f.tree, HostTime(700));
        assert_eq!(fractions(&log), [1.0]);
        assert_eq!(checker.last_exposure().map(|s| s.fraction), Some(1.0));
    }

    #[test]
    fn non_finite_offset_is_delivered_once() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        f.scroll_to(&mut checker, f64::NAN, 10);
        checker.poll(&f.tree, HostTime(200));
        assert_eq!(fractions(&log), [1.0, 0.0]);

        f.tree.set_alpha(f.scroll, 0.5);
        f.flush(&mut checker, 300);
        assert!(checker.next_deadline().is_some());
        checker.poll(&f.tree, HostTime(500));
        assert_eq!(fractions(&log), [1.0, 0.0]);
    }

    #[test]
    fn start_is_idempotent_while_active() {
        let f = feed();
        let (log, handler) = recorder();
        let (other_log, other) = recorder();
        let mut checker = ExposureChecker::new(config());

        checker.start(&f.tree, f.ad, handler, HostTime(0));
        let again = checker.start(&f.tree, f.scroll, other, HostTime(1));
        assert_eq!(again.map(Subscription::target), Some(f.ad));
        assert_eq!(checker.target(), Some(f.ad));
        assert_eq!(log.borrow().len(), 1);
        assert!(other_log.borrow().is_empty());
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));
        f.scroll_to(&mut checker, 40.0, 10);

        assert!(checker.stop());
        assert!(!checker.stop());
        assert_eq!(checker.state(), TrackingState::Stopped);
        assert!(checker.subscription().is_none());
        assert_eq!(checker.target(), None);
        assert_eq!(checker.next_deadline(), None);

        checker.poll(&f.tree, HostTime(1_000));
        f.scroll_to(&mut checker, 80.0, 1_100);
        assert_eq!(log.borrow().len(), 1);

        let (_, handler) = recorder();
        assert!(checker.start(&f.tree, f.ad, handler, HostTime(2_000)).is_none());
        assert_eq!(checker.state(), TrackingState::Stopped);
    }

    #[test]
    fn stopping_an_idle_checker() {
        let mut checker = ExposureChecker::new(config());
        assert!(checker.stop());
        assert!(!checker.stop());
    }

    #[test]
    fn tracking_continues_during_touch() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        checker.handle_touch(&f.tree, TouchPhase::Began, HostTime(5));
        assert_eq!(checker.state(), TrackingState::Observing);
        f.scroll_to(&mut checker, 40.0, 10);
        f.scroll_to(&mut checker, 50.0, 20);
        checker.poll(&f.tree, HostTime(120));

        // The finger is still down.
        assert_eq!(checker.state(), TrackingState::Observing);
        assert_eq!(log.borrow().len(), 2);
        assert!((fractions(&log)[1] - 0.5).abs() < EPS);
    }

    #[test]
    fn polling_with_pause_goes_stale_during_touch() {
        let mut f = feed();
        let (log, handler) = recorder();
        let source = PollingSource::new(PollingConfig {
            interval: Duration(200),
            pause_during_touch: true,
        });
        let mut checker = ExposureChecker::with_source(config(), source);
        checker.start(&f.tree, f.ad, handler, HostTime(0));
        assert_eq!(checker.next_deadline(), Some(HostTime(200)));

        checker.handle_touch(&f.tree, TouchPhase::Began, HostTime(5));
        assert_eq!(checker.state(), TrackingState::Suspended);
        assert_eq!(checker.next_deadline(), None);
        f.scroll_to(&mut checker, 40.0, 10);
        for t in [200, 400, 600, 800] {
            checker.poll(&f.tree, HostTime(t));
        }
        assert_eq!(log.borrow().len(), 1);

        checker.handle_touch(&f.tree, TouchPhase::Ended, HostTime(900));
        assert_eq!(checker.state(), TrackingState::Observing);
        assert_eq!(checker.next_deadline(), Some(HostTime(1_100)));
        checker.poll(&f.tree, HostTime(1_100));
        assert_eq!(log.borrow().len(), 2);
        assert!((fractions(&log)[1] - 0.6).abs() < EPS);
    }

    #[test]
    fn immediate_touch_end_skips_debounce() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(ExposureConfig {
            touch_end: TouchEndPolicy::Immediate,
            ..config()
        });
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        f.scroll_to(&mut checker, 40.0, 10);
        assert!(checker.next_deadline().is_some());
        checker.handle_touch(&f.tree, TouchPhase::Ended, HostTime(20));
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(checker.next_deadline(), None);
    }

    #[test]
    fn detached_target_reports_error_once_and_can_stop() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        f.tree.remove_from_parent(f.ad);
        f.flush(&mut checker, 10);
        checker.poll(&f.tree, HostTime(110));
        assert_eq!(log.borrow().last(), Some(&Err(GeometryError::Detached)));

        // Further signals fail the same way without another notification.
        f.tree.set_frame(f.ad, Rect::new(0.0, 0.0, 320.0, 50.0));
        f.flush(&mut checker, 200);
        checker.poll(&f.tree, HostTime(300));
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(checker.last_exposure().map(|s| s.fraction), Some(1.0));

        assert!(checker.stop());
    }

    #[test]
    fn reattached_target_is_reported_again() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        f.tree.remove_from_parent(f.ad);
        f.flush(&mut checker, 10);
        checker.poll(&f.tree, HostTime(110));
        f.tree.add_child(f.scroll, f.ad);
        f.flush(&mut checker, 200);
        checker.poll(&f.tree, HostTime(300));

        assert_eq!(fractions(&log), [1.0, -1.0, 1.0]);
    }

    #[test]
    fn destroyed_target_reports_released() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        f.tree.destroy_view(f.ad);
        f.flush(&mut checker, 10);
        checker.poll(&f.tree, HostTime(110));
        assert_eq!(
            log.borrow().last(),
            Some(&Err(GeometryError::TargetReleased))
        );
        assert!(checker.is_active());
    }

    #[test]
    fn handler_can_stop_its_own_checker() {
        let mut f = feed();
        let mut checker = ExposureChecker::new(config());
        let stop = checker.stop_handle();
        let calls = Rc::new(Cell::new(0_u32));
        let seen = Rc::clone(&calls);
        let handler = move |u: ExposureUpdate<'_>| {
            seen.set(seen.get() + 1);
            if u.is_ok_and(|s| s.fraction < 1.0) {
                stop.stop();
            }
        };
        checker.start(&f.tree, f.ad, handler, HostTime(0));
        assert!(checker.is_active());

        f.scroll_to(&mut checker, 40.0, 10);
        checker.poll(&f.tree, HostTime(110));
        assert_eq!(checker.state(), TrackingState::Stopped);
        assert_eq!(calls.get(), 2);

        f.scroll_to(&mut checker, 80.0, 200);
        checker.poll(&f.tree, HostTime(300));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn stop_requested_during_baseline() {
        let f = feed();
        let mut checker = ExposureChecker::new(config());
        let stop = checker.stop_handle();
        let sub = checker.start(&f.tree, f.ad, move |_| stop.stop(), HostTime(0));
        assert!(sub.is_none());
        assert_eq!(checker.state(), TrackingState::Stopped);
    }

    #[test]
    fn occlusion_change_is_delivered() {
        let mut f = feed();
        let (log, handler) = recorder();
        let mut checker = ExposureChecker::new(config());
        checker.start(&f.tree, f.ad, handler, HostTime(0));

        let header = f.tree.create_view(Rect::new(0.0, 0.0, 320.0, 25.0));
        f.tree.set_flags(
            header,
            crate::view::ViewFlags {
                opaque: true,
                ..crate::view::ViewFlags::default()
            },
        );
        f.tree.add_child(f.window, header);
        f.flush(&mut checker, 10);
        checker.poll(&f.tree, HostTime(110));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        let state = log[1].as_ref().unwrap();
        assert!((state.fraction - 0.75).abs() < EPS, "got {}", state.fraction);
        assert_eq!(state.obstructions.len(), 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traces_lifecycle_and_evaluations() {
        use alloc::string::String;
        use alloc::vec;

        struct Sink(Rc<RefCell<Vec<String>>>);
        impl TraceSink for Sink {
            fn on_state_change(&mut self, e: &StateChangeEvent) {
                self.0
                    .borrow_mut()
                    .push(alloc::format!("{:?}->{:?}", e.from, e.to));
            }
            fn on_debounce(&mut self, e: &DebounceEvent) {
                self.0
                    .borrow_mut()
                    .push(alloc::format!("debounce@{}", e.deadline.ticks()));
            }
            fn on_evaluation(&mut self, e: &EvaluationEvent) {
                self.0
                    .borrow_mut()
                    .push(alloc::format!("{:?}:{:?}", e.reason, e.outcome));
            }
        }

        let mut f = feed();
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut checker = ExposureChecker::new(config());
        checker.set_trace_sink(Box::new(Sink(Rc::clone(&events))));
        checker.start(&f.tree, f.ad, |_| {}, HostTime(0));
        f.scroll_to(&mut checker, 40.0, 10);
        checker.poll(&f.tree, HostTime(110));
        checker.stop();

        assert_eq!(
            *events.borrow(),
            vec![
                "Idle->Observing",
                "Start:Changed",
                "debounce@110",
                "Scroll:Changed",
                "Observing->Stopped",
            ]
        );
    }
}
