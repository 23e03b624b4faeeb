// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge debouncing on host time.
//!
//! [`Debounce`] is a single pending-call slot: every
//! [`schedule`](Debounce::schedule) replaces the pending argument and pushes
//! the deadline out to `now + interval`, and [`poll`](Debounce::poll) hands
//! the argument back once the deadline has passed with no further calls.
//! [`Debouncer`] pairs a slot with an action for the common case where the
//! caller just wants a function run.
//!
//! Nothing here reads a clock or arms a timer. The host passes `now` into
//! every call and uses [`deadline`](Debounce::deadline) to decide when to
//! wake up and poll, so the action always runs on the host's own loop.
//!
//! ```text
//!   call(a) call(b)   call(c)
//!     │       │         │
//!   ──┴───────┴─────────┴──────────────┬──────▶ time
//!                       │◀─ interval ─▶│
//!                                  action(c)
//! ```
//!
//! There is no leading-edge invocation: a single isolated call runs once,
//! one interval after it was made.

use core::fmt;

use crate::time::{Duration, HostTime};

#[derive(Clone, Copy, Debug)]
struct Pending<T> {
    param: T,
    deadline: HostTime,
}

/// A trailing-edge debounce slot holding at most one pending argument.
#[derive(Clone, Debug)]
pub struct Debounce<T> {
    interval: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debounce<T> {
    /// Creates an empty slot with the given quiet interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Records `param` as the latest argument and restarts the interval.
    ///
    /// Returns `true` if a previously pending argument was replaced.
    pub fn schedule(&mut self, param: T, now: HostTime) -> bool {
        let deadline = now.saturating_add(self.interval);
        self.pending.replace(Pending { param, deadline }).is_some()
    }

    /// Takes the pending argument if its deadline is at or before `now`.
    pub fn poll(&mut self, now: HostTime) -> Option<T> {
        match self.pending {
            Some(Pending { deadline, .. }) if deadline <= now => {
                self.pending.take().map(|p| p.param)
            }
            _ => None,
        }
    }

    /// Drops the pending argument. Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// When the pending argument becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether an argument is waiting for its deadline.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The quiet interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the quiet interval. An already pending deadline is kept.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}

/// A [`Debounce`] slot bound to an action.
///
/// Created with [`debounce`].
pub struct Debouncer<T, F> {
    slot: Debounce<T>,
    action: F,
}

impl<T: fmt::Debug, F> fmt::Debug for Debouncer<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// Wraps `action` so that bursts of calls closer together than `interval`
/// collapse into one invocation with the most recent argument.
pub fn debounce<T, F: FnMut(T)>(action: F, interval: Duration) -> Debouncer<T, F> {
    Debouncer {
        slot: Debounce::new(interval),
        action,
    }
}

impl<T, F: FnMut(T)> Debouncer<T, F> {
    /// Schedules `action(param)` for one interval after `now`, replacing any
    /// pending argument.
    pub fn call(&mut self, param: T, now: HostTime) {
        self.slot.schedule(param, now);
    }

    /// Runs the action if the pending call is due. Returns whether it ran.
    pub fn poll(&mut self, now: HostTime) -> bool {
        match self.slot.poll(now) {
            Some(param) => {
                (self.action)(param);
                true
            }
            None => false,
        }
    }

    /// Drops the pending call without running it. Returns `true` if there
    /// was one.
    pub fn cancel(&mut self) -> bool {
        self.slot.cancel()
    }

    /// When the pending call becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        self.slot.deadline()
    }

    /// Whether a call is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }
}
