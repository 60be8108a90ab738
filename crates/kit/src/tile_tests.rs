// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn tile(x: i64, y: i64, ver: u64) -> TileDesc {
    TileDesc {
        part: 0,
        edit_mode: 0,
        tile_pos_x: x,
        tile_pos_y: y,
        tile_width: 256,
        tile_height: 256,
        pixel_width: 256,
        pixel_height: 256,
        version: ver,
        id: None,
        nviewid: 1,
    }
}

#[test]
fn key_excludes_version_and_id() {
    let a = tile(0, 0, 1);
    let mut b = tile(0, 0, 2);
    b.id = Some(7);
    assert_eq!(a.key(), b.key());
}

#[test]
fn rect_intersection_and_containment() {
    let a = Rect::new(0, 0, 100, 100);
    let b = Rect::new(50, 50, 100, 100);
    let c = Rect::new(200, 200, 10, 10);
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert!(Rect::new(10, 10, 10, 10).contained_in(&a));
    assert!(!b.contained_in(&a));
}

#[test]
fn union_covers_both_rects() {
    let a = Rect::new(0, 0, 1000, 1000);
    let b = Rect::new(500, 500, 1000, 1000);
    let u = a.union(&b);
    assert_eq!(u, Rect::new(0, 0, 1500, 1500));
}

#[test]
fn combined_dedup_by_position() {
    let mut combined = TileCombined::new(tile(0, 0, 1).combine_class());
    combined.push_dedup(tile(0, 0, 1));
    combined.push_dedup(tile(0, 0, 2));
    combined.push_dedup(tile(256, 0, 1));
    assert_eq!(combined.tiles.len(), 2);
    assert_eq!(combined.tiles[0].version, 2);
}
