// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner canonicalisation: assign four unordered page corners to the
// top-left, top-right, bottom-right and bottom-left roles.

use std::cmp::Ordering;

use crate::types::{OrderedCorners, Point};

/// Order four points as `[TL, TR, BR, BL]` (clockwise on screen).
///
/// The two points with the smallest y form the top pair, sorted left to
/// right; the remaining two form the bottom pair, also sorted left to right
/// and then emitted right-first. Ties on the primary key are broken by the
/// other coordinate, so the result depends only on the point set and
/// re-ordering an ordered set is a no-op.
///
/// Collinear or repeated points still produce an ordering, but it carries no
/// geometric meaning.
pub fn order_corners(points: [Point; 4]) -> OrderedCorners {
    let mut by_y = points;
    by_y.sort_by(by_y_then_x);

    let mut top = [by_y[0], by_y[1]];
    let mut bottom = [by_y[2], by_y[3]];
    top.sort_by(by_x_then_y);
    bottom.sort_by(by_x_then_y);

    OrderedCorners {
        top_left: top[0],
        top_right: top[1],
        bottom_right: bottom[1],
        bottom_left: bottom[0],
    }
}

fn by_y_then_x(a: &Point, b: &Point) -> Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

fn by_x_then_y(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
