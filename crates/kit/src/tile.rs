// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tile value types: a single requested tile, and a batch of combinable
//! tiles sharing the same part/mode/size class.

use serde::{Deserialize, Serialize};

/// Document-coordinate rectangle, used both for invalidations and cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub const EMPTY: Rect = Rect { x: 0, y: 0, width: 0, height: 0 };

    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// The whole-part sentinel used when numeric parsing would overflow.
    pub fn whole_part() -> Self {
        Self { x: 0, y: 0, width: i64::MAX, height: i64::MAX }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if `self` is fully covered by `other`.
    pub fn contained_in(&self, other: &Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.right() <= other.right()
            && self.bottom() <= other.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect { x, y, width: right - x, height: bottom - y }
    }
}

/// A single requested tile: `(part, edit_mode, tile_pos_x, tile_pos_y,
/// tile_width, tile_height, pixel_width, pixel_height)` plus the fields
/// excluded from dedup equality (`version`, `id`, the requesting view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDesc {
    pub part: i32,
    pub edit_mode: i32,
    pub tile_pos_x: i64,
    pub tile_pos_y: i64,
    pub tile_width: i64,
    pub tile_height: i64,
    pub pixel_width: i32,
    pub pixel_height: i32,
    pub version: u64,
    /// The preview marker. `Some` means this tile is a thumbnail request:
    /// exempt from position dedup and from priority boosting.
    pub id: Option<i32>,
    /// View id of the requesting session, used to route the rendered frame
    /// back to its origin (distinct from the cursor-owning `view_id` used
    /// for priority in `TileQueue::pop`).
    pub nviewid: i32,
}

impl TileDesc {
    /// The key used for dedup/combinability: excludes `version` and `id`.
    pub fn key(&self) -> TileKey {
        TileKey {
            part: self.part,
            edit_mode: self.edit_mode,
            tile_pos_x: self.tile_pos_x,
            tile_pos_y: self.tile_pos_y,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
        }
    }

    pub fn is_preview(&self) -> bool {
        self.id.is_some()
    }

    /// The class of tiles this one may be combined with: same part,
    /// edit_mode, and both size dimensions.
    pub fn combine_class(&self) -> CombineClass {
        CombineClass {
            part: self.part,
            edit_mode: self.edit_mode,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
        }
    }

    pub fn doc_rect(&self) -> Rect {
        Rect::new(self.tile_pos_x, self.tile_pos_y, self.tile_width, self.tile_height)
    }
}

/// Equality/dedup key for a tile: all fields except `version`/`id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub part: i32,
    pub edit_mode: i32,
    pub tile_pos_x: i64,
    pub tile_pos_y: i64,
    pub tile_width: i64,
    pub tile_height: i64,
    pub pixel_width: i32,
    pub pixel_height: i32,
}

/// The subset of fields that must match for two tiles to be combinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombineClass {
    pub part: i32,
    pub edit_mode: i32,
    pub tile_width: i64,
    pub tile_height: i64,
    pub pixel_width: i32,
    pub pixel_height: i32,
}

/// A batch of tiles sharing a [`CombineClass`], rendered together.
///
/// Invariant: no two constituents share `(tile_pos_x, tile_pos_y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCombined {
    pub class: CombineClass,
    pub tiles: Vec<TileDesc>,
}

impl TileCombined {
    pub fn new(class: CombineClass) -> Self {
        Self { class, tiles: Vec::new() }
    }

    /// Insert `tile`, deduplicating by `(tile_pos_x, tile_pos_y)` — a later
    /// insert replaces an earlier one at the same position.
    pub fn push_dedup(&mut self, tile: TileDesc) {
        if let Some(existing) =
            self.tiles.iter_mut().find(|t| t.tile_pos_x == tile.tile_pos_x && t.tile_pos_y == tile.tile_pos_y)
        {
            *existing = tile;
        } else {
            self.tiles.push(tile);
        }
    }

    /// The union rectangle in document coordinates covering every
    /// constituent tile.
    pub fn union_rect(&self) -> Option<Rect> {
        self.tiles.iter().map(TileDesc::doc_rect).reduce(|a, b| a.union(&b))
    }

    pub fn is_single(&self) -> bool {
        self.tiles.len() == 1
    }
}

#[cfg(test)]
#[path = "tile_tests.rs"]
mod tests;
