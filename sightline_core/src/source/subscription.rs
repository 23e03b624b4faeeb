// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::view::{ViewId, ViewKind, ViewTree};

/// The set of views whose signals matter for one target.
///
/// Resolved from the target's ancestor chain: the window it is displayed in
/// and every scroll container between the two. A detached or destroyed
/// target resolves to a subscription with no window and no containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    target: ViewId,
    window: Option<ViewId>,
    containers: Vec<ViewId>,
}

impl Subscription {
    /// Resolves the subscription for `target` against the current tree.
    #[must_use]
    pub fn resolve(tree: &ViewTree, target: ViewId) -> Self {
        if !tree.is_alive(target) {
            return Self {
                target,
                window: None,
                containers: Vec::new(),
            };
        }
        let window = tree.window_of(target);
        let containers = if window.is_some() {
            tree.ancestors(target)
                .filter(|&v| tree.kind(v) == ViewKind::Scroll)
                .collect()
        } else {
            Vec::new()
        };
        Self {
            target,
            window,
            containers,
        }
    }

    /// The tracked view.
    #[must_use]
    pub fn target(&self) -> ViewId {
        self.target
    }

    /// The window the target is displayed in, if attached.
    #[must_use]
    pub fn window(&self) -> Option<ViewId> {
        self.window
    }

    /// Scroll containers between the target and its window, nearest first.
    #[must_use]
    pub fn containers(&self) -> &[ViewId] {
        &self.containers
    }

    /// Whether the target was attached to a window when resolved.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.window.is_some()
    }
}
