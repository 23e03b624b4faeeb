// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven event source.

use super::{
    ExposureEventSource, Subscription, TouchEndPolicy, TouchPhase, Trigger, TriggerReason,
};
use crate::time::HostTime;
use crate::view::{ViewChanges, ViewId, ViewTree, WindowCache};

/// Triggers evaluations from hierarchy change signals.
///
/// Every signal is mapped to one debounced [`Trigger`] per
/// [`ViewChanges`] batch. When several signals arrive together the most
/// specific reason wins, in this order: scroll, window resize, layout,
/// visibility, topology.
///
/// Touches never suspend the source. Scrolling under a finger keeps
/// producing scroll signals, and the end of a touch sequence is handled
/// according to the configured [`TouchEndPolicy`].
#[derive(Clone, Debug, Default)]
pub struct ScrollSource {
    touch_end: TouchEndPolicy,
    subscription: Option<Subscription>,
    windows: WindowCache,
}

impl ScrollSource {
    /// Creates an unsubscribed source.
    #[must_use]
    pub fn new(touch_end: TouchEndPolicy) -> Self {
        Self {
            touch_end,
            subscription: None,
            windows: WindowCache::default(),
        }
    }

    /// The configured touch-end policy.
    #[must_use]
    pub fn touch_end(&self) -> TouchEndPolicy {
        self.touch_end
    }
}

impl ExposureEventSource for ScrollSource {
    fn subscribe(&mut self, tree: &ViewTree, target: ViewId, _now: HostTime) -> &Subscription {
        self.subscription.insert(Subscription::resolve(tree, target))
    }

    fn unsubscribe(&mut self) -> bool {
        self.subscription.take().is_some()
    }

    fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    fn on_view_changes(
        &mut self,
        tree: &ViewTree,
        changes: &ViewChanges,
        _now: HostTime,
    ) -> Option<Trigger> {
        let sub = self.subscription.as_mut()?;

        let restructured = changes.topology_changed || !changes.removed.is_empty();
        if restructured {
            *sub = Subscription::resolve(tree, sub.target());
        }

        let target = sub.target().index();
        let window = sub.window().map(ViewId::index);

        let scrolled = sub
            .containers()
            .iter()
            .any(|c| changes.scrolled.contains(&c.index()));
        let resized = window.is_some_and(|w| changes.layout.contains(&w));
        let moved = changes.geometry.contains(&target);
        let shown = changes.visibility.contains(&target);
        // Another view in the same window moved or changed visibility and
        // may now cover (or uncover) the target. Only needed when no more
        // specific reason applies.
        let windows = &mut self.windows;
        let mut neighbor = || {
            let Some(w) = window else {
                return false;
            };
            windows.reset();
            changes
                .geometry
                .iter()
                .chain(&changes.visibility)
                .any(|&i| i != target && tree.window_index_cached(i, windows) == Some(w))
        };

        let reason = if scrolled {
            TriggerReason::Scroll
        } else if resized {
            TriggerReason::WindowResize
        } else if moved || neighbor() {
            TriggerReason::Layout
        } else if shown {
            TriggerReason::Visibility
        } else if restructured {
            TriggerReason::Topology
        } else {
            return None;
        };
        Some(Trigger::debounced(reason))
    }

    fn on_touch(&mut self, phase: TouchPhase, _now: HostTime) -> Option<Trigger> {
        if self.subscription.is_none() || !phase.is_end() {
            return None;
        }
        match self.touch_end {
            TouchEndPolicy::Debounced => Some(Trigger::debounced(TriggerReason::Touch)),
            TouchEndPolicy::Immediate => Some(Trigger::immediate(TriggerReason::Touch)),
            TouchEndPolicy::Ignore => None,
        }
    }
}
