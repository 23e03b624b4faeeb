// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry evaluation.
//!
//! Evaluation walks the target's ancestor chain once:
//!
//! 1. **Resolve**: collect the chain from the target up to its root and
//!    fail if the handle is stale or the root is not a window.
//! 2. **Place**: going back down from the window, compute each view's world
//!    rectangle as its frame shifted by the parent's world origin minus the
//!    parent's content offset.
//! 3. **Clip**: intersect the target's rectangle with every clipping
//!    ancestor. The window always clips, so its frame acts as the viewport.
//! 4. **Occlude**: for each view on the chain, every later sibling is drawn
//!    above it. Visible opaque views among those siblings (and their
//!    subtrees) are recorded as obstructions, clipped to the visible rect.
//! 5. **Measure**: the fraction is the visible area not covered by the
//!    union of obstructions, divided by the target's total area.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use super::error::GeometryError;
use super::region::uncovered_area;
use super::state::ExposureState;
use crate::view::{INVALID, ViewId, ViewKind, ViewTree};

/// Measures the exposure of `target` within `tree`.
///
/// # Errors
///
/// Returns [`GeometryError::TargetReleased`] if `target` has been destroyed
/// and [`GeometryError::Detached`] if its root is not a window. A view that
/// is attached but hidden, fully transparent, or scrolled out of sight is not
/// an error; it measures as [`ExposureState::invisible`].
pub fn evaluate(tree: &ViewTree, target: ViewId) -> Result<ExposureState, GeometryError> {
    if !tree.is_alive(target) {
        return Err(GeometryError::TargetReleased);
    }

    // chain[0] is the target, the last element is the root.
    let mut chain = Vec::new();
    let mut idx = target.idx;
    loop {
        chain.push(idx);
        let parent = tree.parent[idx as usize];
        if parent == INVALID {
            break;
        }
        idx = parent;
    }
    let root = chain.len() - 1;
    if tree.kind[chain[root] as usize] != ViewKind::Window {
        return Err(GeometryError::Detached);
    }

    let mut world = vec![Rect::ZERO; chain.len()];
    world[root] = tree.frame[chain[root] as usize];
    let mut clip = world[root];
    let mut shown = is_shown(tree, chain[root]);
    for i in (0..root).rev() {
        world[i] = place(tree, chain[i + 1], world[i + 1], chain[i]);
        shown &= is_shown(tree, chain[i]);
        if i > 0 && clips(tree, chain[i]) {
            clip = clip.intersect(world[i]);
        }
    }

    let total_rect = world[0];
    let visible_rect = total_rect.intersect(clip);
    // Non-finite frames or offsets measure as invisible so that repeated
    // evaluations compare equal.
    if !shown
        || !total_rect.is_finite()
        || !visible_rect.is_finite()
        || visible_rect.area() <= 0.0
    {
        return Ok(ExposureState::invisible(total_rect));
    }

    let mut obstructions = Vec::new();
    for i in 0..root {
        let mut sibling = tree.next_sibling[chain[i] as usize];
        while sibling != INVALID {
            collect_obstructions(
                tree,
                sibling,
                chain[i + 1],
                world[i + 1],
                visible_rect,
                &mut obstructions,
            );
            sibling = tree.next_sibling[sibling as usize];
        }
    }

    let total_area = total_rect.area();
    let fraction = if total_area > 0.0 {
        (uncovered_area(visible_rect, &obstructions) / total_area).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(ExposureState {
        fraction,
        visible_rect,
        total_rect,
        obstructions,
    })
}

/// World rectangle of `idx`, given its parent's slot and world rectangle.
fn place(tree: &ViewTree, parent: u32, parent_world: Rect, idx: u32) -> Rect {
    let shift = parent_world.origin().to_vec2() - tree.content_offset[parent as usize];
    tree.frame[idx as usize] + shift
}

fn is_shown(tree: &ViewTree, idx: u32) -> bool {
    !tree.flags[idx as usize].hidden && tree.alpha[idx as usize] > 0.0
}

fn clips(tree: &ViewTree, idx: u32) -> bool {
    tree.kind[idx as usize].always_clips() || tree.flags[idx as usize].clips_to_bounds
}

/// Records the parts of `region` covered by `idx` or its descendants.
fn collect_obstructions(
    tree: &ViewTree,
    idx: u32,
    parent: u32,
    parent_world: Rect,
    region: Rect,
    out: &mut Vec<Rect>,
) {
    if !is_shown(tree, idx) {
        return;
    }
    let rect = place(tree, parent, parent_world, idx);
    let covered = rect.intersect(region);
    let opaque = tree.flags[idx as usize].opaque;
    if opaque && covered.area() > 0.0 {
        out.push(covered);
    }

    let clipping = clips(tree, idx);
    // A clipping opaque view already hides everything its subtree could.
    if clipping && opaque {
        return;
    }
    let child_region = if clipping { covered } else { region };
    if child_region.area() <= 0.0 {
        return;
    }
    let mut child = tree.first_child[idx as usize];
    while child != INVALID {
        collect_obstructions(tree, child, idx, rect, child_region, out);
        child = tree.next_sibling[child as usize];
    }
}
