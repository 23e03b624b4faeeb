// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer-polling event source.

use super::{ExposureEventSource, Subscription, TouchPhase, Trigger, TriggerReason};
use crate::time::{Duration, HostTime, Timebase};
use crate::view::{ViewChanges, ViewId, ViewTree};

/// Configuration for a [`PollingSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollingConfig {
    /// Time between polls.
    pub interval: Duration,
    /// Stop polling between touch begin and touch end.
    pub pause_during_touch: bool,
}

impl PollingConfig {
    /// Default polling configuration: a 200 ms interval, paused during
    /// touches.
    #[must_use]
    pub const fn new(timebase: Timebase) -> Self {
        Self {
            interval: Duration::from_millis(200, timebase),
            pause_during_touch: true,
        }
    }
}

/// Triggers an immediate evaluation on a fixed interval.
///
/// Hierarchy signals are only used to keep the subscription current; they
/// never trigger on their own. With
/// [`pause_during_touch`](PollingConfig::pause_during_touch) set, no polls
/// are due while a touch is in progress, so exposure goes stale for the
/// whole of a drag.
#[derive(Clone, Debug)]
pub struct PollingSource {
    config: PollingConfig,
    subscription: Option<Subscription>,
    next_poll: Option<HostTime>,
    touching: bool,
}

impl PollingSource {
    /// Creates an unsubscribed source.
    #[must_use]
    pub fn new(config: PollingConfig) -> Self {
        Self {
            config,
            subscription: None,
            next_poll: None,
            touching: false,
        }
    }

    /// The source's configuration.
    #[must_use]
    pub fn config(&self) -> &PollingConfig {
        &self.config
    }
}

impl ExposureEventSource for PollingSource {
    fn subscribe(&mut self, tree: &ViewTree, target: ViewId, now: HostTime) -> &Subscription {
        self.next_poll = Some(now.saturating_add(self.config.interval));
        self.touching = false;
        self.subscription.insert(Subscription::resolve(tree, target))
    }

    fn unsubscribe(&mut self) -> bool {
        self.next_poll = None;
        self.touching = false;
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
        if changes.topology_changed || !changes.removed.is_empty() {
            *sub = Subscription::resolve(tree, sub.target());
        }
        None
    }

    fn on_touch(&mut self, phase: TouchPhase, now: HostTime) -> Option<Trigger> {
        if self.subscription.is_none() || !self.config.pause_during_touch {
            return None;
        }
        match phase {
            TouchPhase::Began => self.touching = true,
            TouchPhase::Moved => {}
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.touching {
                    self.touching = false;
                    self.next_poll = Some(now.saturating_add(self.config.interval));
                }
            }
        }
        None
    }

    fn poll(&mut self, now: HostTime) -> Option<Trigger> {
        if self.is_suspended() {
            return None;
        }
        match self.next_poll {
            Some(due) if due <= now => {
                self.next_poll = Some(now.saturating_add(self.config.interval));
                Some(Trigger::immediate(TriggerReason::Poll))
            }
            _ => None,
        }
    }

    fn next_deadline(&self) -> Option<HostTime> {
        if self.is_suspended() {
            None
        } else {
            self.next_poll
        }
    }

    fn is_suspended(&self) -> bool {
        self.touching
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;

    fn source(pause: bool) -> (ViewTree, PollingSource) {
        let mut tree = ViewTree::new();
        let window = tree.create_window(Rect::new(0.0, 0.0, 100.0, 100.0));
        let ad = tree.create_view(Rect::new(0.0, 0.0, 10.0, 10.0));
        tree.add_child(window, ad);
        let mut source = PollingSource::new(PollingConfig {
            interval: Duration(100),
            pause_during_touch: pause,
        });
        source.subscribe(&tree, ad, HostTime(0));
        (tree, source)
    }

    #[test]
    fn default_config() {
        let config = PollingConfig::new(Timebase::NANOS);
        assert_eq!(config.interval, Duration(200_000_000));
        assert!(config.pause_during_touch);
    }

    #[test]
    fn polls_on_interval() {
        let (_, mut source) = source(true);
        assert_eq!(source.next_deadline(), Some(HostTime(100)));
        assert_eq!(source.poll(HostTime(99)), None);
        assert_eq!(
            source.poll(HostTime(100)),
            Some(Trigger::immediate(TriggerReason::Poll))
        );
        assert_eq!(source.next_deadline(), Some(HostTime(200)));
    }

    #[test]
    fn hierarchy_signals_do_not_trigger() {
        let (mut tree, mut source) = source(true);
        let changes = tree.evaluate();
        assert!(!changes.is_empty());
        assert_eq!(source.on_view_changes(&tree, &changes, HostTime(0)), None);
    }

    #[test]
    fn pauses_between_touch_begin_and_end() {
        let (_, mut source) = source(true);
        assert_eq!(source.on_touch(TouchPhase::Began, HostTime(50)), None);
        assert!(source.is_suspended());
        assert_eq!(source.next_deadline(), None);
        assert_eq!(source.poll(HostTime(500)), None);

        source.on_touch(TouchPhase::Ended, HostTime(600));
        assert!(!source.is_suspended());
        assert_eq!(source.next_deadline(), Some(HostTime(700)));
        assert!(source.poll(HostTime(700)).is_some());
    }

    #[test]
    fn keeps_polling_when_not_configured_to_pause() {
        let (_, mut source) = source(false);
        source.on_touch(TouchPhase::Began, HostTime(50));
        assert!(!source.is_suspended());
        assert!(source.poll(HostTime(100)).is_some());
    }

    #[test]
    fn unsubscribe_stops_polling() {
        let (_, mut source) = source(true);
        assert!(source.unsubscribe());
        assert!(!source.unsubscribe());
        assert_eq!(source.next_deadline(), None);
        assert_eq!(source.poll(HostTime(1000)), None);
    }
}
