// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-view cursor rectangles and recency ordering, used by [`crate::tile_queue::TileQueue`]
//! to boost the priority of tiles near the most recently active view.

use std::collections::HashMap;

use crate::tile::Rect;

/// Per-view cursor position plus a recency-ordered view list.
///
/// The last element of `order` is the most recently active view; its
/// index is the priority ceiling a tile can reach in
/// [`TileQueue::pop`](crate::tile_queue::TileQueue::pop).
#[derive(Debug, Default)]
pub struct CursorTracker {
    cursors: HashMap<i32, (i32, Rect)>,
    order: Vec<i32>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the cursor rectangle for `view_id` and move it to the back
    /// of the recency order (most recently active).
    pub fn update(&mut self, view_id: i32, part: i32, rect: Rect) {
        self.cursors.insert(view_id, (part, rect));
        self.order.retain(|&v| v != view_id);
        self.order.push(view_id);
    }

    pub fn remove(&mut self, view_id: i32) {
        self.cursors.remove(&view_id);
        self.order.retain(|&v| v != view_id);
    }

    pub fn rect(&self, view_id: i32) -> Option<Rect> {
        self.cursors.get(&view_id).map(|(_, r)| *r)
    }

    /// The view-order list, oldest-activity first, most-recent last.
    pub fn order(&self) -> &[i32] {
        &self.order
    }

    /// `priority(tile) = max{ i : tile intersects cursor_rect(order[i]) }`,
    /// or `-1` if the tile intersects no cursor.
    pub fn priority_of(&self, part: i32, rect: &Rect) -> i64 {
        let mut best = -1i64;
        for (i, &view_id) in self.order.iter().enumerate() {
            if let Some((cursor_part, cursor_rect)) = self.cursors.get(&view_id) {
                if *cursor_part == part && rect.intersects(cursor_rect) {
                    best = best.max(i as i64);
                }
            }
        }
        best
    }

    /// The highest achievable priority: the index of the most recent view,
    /// used to short-circuit scanning once it's reached.
    pub fn max_priority(&self) -> i64 {
        self.order.len() as i64 - 1
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
