// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, ViewId};
use super::store::ViewTree;

/// An iterator over the direct children of a view, bottom-most first.
///
/// Created by [`ViewTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ViewTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a ViewTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let id = self.tree.handle_at(self.current)?;
        self.current = self.tree.next_sibling[self.current as usize];
        Some(id)
    }
}

/// An iterator over the ancestors of a view, nearest first.
///
/// Created by [`ViewTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a ViewTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a ViewTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        if self.current == INVALID {
            return None;
        }
        let id = self.tree.handle_at(self.current)?;
        self.current = self.tree.parent[self.current as usize];
        Some(id)
    }
}
