// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle fragmentation for obstruction accounting.
//!
//! Obstructions may overlap each other, so their areas cannot simply be
//! summed. Instead the visible rectangle is split into disjoint fragments and
//! every obstruction carves the fragments further; whatever remains is the
//! exposed area.

use alloc::vec::Vec;

use kurbo::Rect;

/// Pushes the parts of `rect` not covered by `hole` onto `out`.
///
/// Produces at most four disjoint rectangles: full-width bands above and
/// below the hole, then the left and right remainders beside it.
pub(crate) fn subtract(rect: Rect, hole: Rect, out: &mut Vec<Rect>) {
    let inter = rect.intersect(hole);
    if inter.area() <= 0.0 {
        out.push(rect);
        return;
    }
    if inter.y0 > rect.y0 {
        out.push(Rect::new(rect.x0, rect.y0, rect.x1, inter.y0));
    }
    if inter.y1 < rect.y1 {
        out.push(Rect::new(rect.x0, inter.y1, rect.x1, rect.y1));
    }
    if inter.x0 > rect.x0 {
        out.push(Rect::new(rect.x0, inter.y0, inter.x0, inter.y1));
    }
    if inter.x1 < rect.x1 {
        out.push(Rect::new(inter.x1, inter.y0, rect.x1, inter.y1));
    }
}

/// Area of `visible` left uncovered by the union of `obstructions`.
pub(crate) fn uncovered_area(visible: Rect, obstructions: &[Rect]) -> f64 {
    let mut fragments = Vec::from([visible]);
    let mut next = Vec::new();
    for &hole in obstructions {
        for &fragment in &fragments {
            subtract(fragment, hole, &mut next);
        }
        core::mem::swap(&mut fragments, &mut next);
        next.clear();
        if fragments.is_empty() {
            return 0.0;
        }
    }
    fragments.iter().map(|r| r.area()).sum()
}
