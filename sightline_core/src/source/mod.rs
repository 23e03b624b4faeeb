// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event sources that decide when a tracked view must be re-measured.
//!
//! An [`ExposureEventSource`] sits between the host and the
//! [`ExposureChecker`](crate::checker::ExposureChecker). The checker forwards
//! hierarchy changes, touch phases and timer wake-ups to it; the source
//! answers with an optional [`Trigger`] saying why an evaluation is needed
//! and whether it may be debounced.
//!
//! Two strategies are provided:
//!
//! - [`ScrollSource`] reacts to [`ViewChanges`] that can move or reveal the
//!   target: a subscribed scroll container scrolled, the window resized, the
//!   target or a view that may cover it changed, or the hierarchy was
//!   restructured. It never pauses during touches.
//! - [`PollingSource`] re-measures on a fixed timer and can be configured to
//!   stop polling while a finger is down, which is how a purely timer-driven
//!   tracker behaves on a run loop that defers timers during tracking.

mod polling;
mod scroll;
mod subscription;

pub use polling::{PollingConfig, PollingSource};
pub use scroll::ScrollSource;
pub use subscription::Subscription;

use crate::time::HostTime;
use crate::view::{ViewChanges, ViewId, ViewTree};

/// Phase of a touch sequence reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// A finger went down.
    Began,
    /// A finger moved while down.
    Moved,
    /// The last finger was lifted.
    Ended,
    /// The system cancelled the touch sequence.
    Cancelled,
}

impl TouchPhase {
    /// Whether this phase ends a touch sequence.
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Why an evaluation was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// The checker started tracking.
    Start,
    /// A scroll container between the target and its window scrolled.
    Scroll,
    /// The target's window changed size or position.
    WindowResize,
    /// The target, an ancestor, or a view that may cover it moved.
    Layout,
    /// The target's effective visibility may have changed.
    Visibility,
    /// Views were attached, detached, created, or destroyed.
    Topology,
    /// A touch sequence ended.
    Touch,
    /// The polling timer fired.
    Poll,
}

/// A request to re-measure the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Trigger {
    /// What caused the request.
    pub reason: TriggerReason,
    /// Whether the evaluation must run now rather than after the debounce
    /// interval.
    pub immediate: bool,
}

impl Trigger {
    /// A trigger that goes through the debounce slot.
    #[must_use]
    pub const fn debounced(reason: TriggerReason) -> Self {
        Self {
            reason,
            immediate: false,
        }
    }

    /// A trigger that bypasses the debounce slot.
    #[must_use]
    pub const fn immediate(reason: TriggerReason) -> Self {
        Self {
            reason,
            immediate: true,
        }
    }
}

/// What a [`ScrollSource`] does when a touch sequence ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchEndPolicy {
    /// Schedule a debounced evaluation, like any scroll signal.
    #[default]
    Debounced,
    /// Evaluate right away.
    Immediate,
    /// Do nothing; scroll signals alone keep the exposure current.
    Ignore,
}

/// A strategy that turns host signals into evaluation [`Trigger`]s.
///
/// Implementations hold at most one [`Subscription`]. All methods are called
/// from the host loop through the checker; none of them may block.
pub trait ExposureEventSource {
    /// Starts listening for signals that affect `target`, replacing any
    /// previous subscription.
    fn subscribe(&mut self, tree: &ViewTree, target: ViewId, now: HostTime) -> &Subscription;

    /// Releases the subscription. Returns `false` if there was none, so
    /// repeated calls are harmless.
    fn unsubscribe(&mut self) -> bool;

    /// The current subscription, if subscribed.
    fn subscription(&self) -> Option<&Subscription>;

    /// Whether a subscription is held.
    fn is_subscribed(&self) -> bool {
        self.subscription().is_some()
    }

    /// Inspects the signals from one [`ViewTree::evaluate`] call.
    fn on_view_changes(
        &mut self,
        tree: &ViewTree,
        changes: &ViewChanges,
        now: HostTime,
    ) -> Option<Trigger>;

    /// Reacts to a touch phase.
    fn on_touch(&mut self, phase: TouchPhase, now: HostTime) -> Option<Trigger>;

    /// Reacts to a timer wake-up requested through
    /// [`next_deadline`](Self::next_deadline).
    fn poll(&mut self, now: HostTime) -> Option<Trigger> {
        _ = now;
        None
    }

    /// When the source next wants [`poll`](Self::poll) called, if ever.
    fn next_deadline(&self) -> Option<HostTime> {
        None
    }

    /// Whether the source is currently withholding triggers.
    fn is_suspended(&self) -> bool {
        false
    }
}
