// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::callback::CallbackKind;
use crate::document::Document;
use crate::message::Message;
use crate::session::ChildSession;
use crate::test_support::FakeEngine;
use crate::tile::{CombineClass, TileDesc};

fn tile(nviewid: i32, x: i64, y: i64) -> TileDesc {
    TileDesc {
        part: 0,
        edit_mode: 0,
        tile_pos_x: x,
        tile_pos_y: y,
        tile_width: 3840,
        tile_height: 3840,
        pixel_width: 256,
        pixel_height: 256,
        version: 1,
        id: None,
        nviewid,
    }
}

fn wired_document() -> anyhow::Result<(Arc<Document>, String)> {
    let doc = Arc::new(Document::new("doc-1", Box::new(FakeEngine::default())));
    doc.create_session(ChildSession::new("s1", "u1", "Alice"));
    let view_id = match doc.on_load("s1", "file:///doc.odt", None)? {
        crate::document::LoadOutcome::Loaded { view_id } => view_id,
        other => anyhow::bail!("unexpected load outcome: {other:?}"),
    };
    Ok((doc, view_id.to_string()))
}

#[test]
fn dispatch_tile_paints_and_routes_to_requesting_session() -> anyhow::Result<()> {
    let (doc, view_id) = wired_document()?;
    let nviewid: i32 = view_id.parse()?;
    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::Tile(tile(nviewid, 0, 0)));

    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].session_id, "s1");
    assert!(frames[0].bytes.starts_with(b"tile: "));
    Ok(())
}

#[test]
fn tile_batch_splits_per_requesting_session() -> anyhow::Result<()> {
    let doc = Arc::new(Document::new("doc-1", Box::new(FakeEngine::default())));
    doc.create_session(ChildSession::new("s1", "u1", "Alice"));
    doc.create_session(ChildSession::new("s2", "u2", "Bob"));
    let v1 = match doc.on_load("s1", "file:///doc.odt", None)? {
        crate::document::LoadOutcome::Loaded { view_id } => view_id,
        other => anyhow::bail!("{other:?}"),
    };
    let v2 = match doc.on_load("s2", "file:///doc.odt", None)? {
        crate::document::LoadOutcome::Loaded { view_id } => view_id,
        other => anyhow::bail!("{other:?}"),
    };

    let class = CombineClass { part: 0, edit_mode: 0, tile_width: 3840, tile_height: 3840, pixel_width: 256, pixel_height: 256 };
    let mut combined = crate::tile::TileCombined::new(class);
    combined.push_dedup(tile(v1, 0, 0));
    combined.push_dedup(tile(v2, 3840, 0));
    doc.queue.put(Message::TileBatch(combined));

    let dispatcher = RenderDispatcher::new(doc);
    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert_eq!(frames.len(), 2);
    let sessions: Vec<_> = frames.iter().map(|f| f.session_id.clone()).collect();
    assert!(sessions.contains(&"s1".to_string()));
    assert!(sessions.contains(&"s2".to_string()));
    Ok(())
}

#[test]
fn callback_broadcasts_through_document() -> anyhow::Result<()> {
    let (doc, _view_id) = wired_document()?;
    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::Callback(CallbackRecord::new(
        CallbackRecord::BROADCAST,
        CallbackKind::DocumentSizeChanged,
        "1000, 2000",
    )));

    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].session_id, "s1");
    assert_eq!(frames[0].bytes, b"documentsizechanged: 1000, 2000");
    Ok(())
}

#[test]
fn child_useractive_replays_through_dispatcher() -> anyhow::Result<()> {
    let (doc, view_id) = wired_document()?;
    let nviewid: i32 = view_id.parse()?;
    doc.deactivate_session("s1");
    doc.route_callback(&CallbackRecord::new(nviewid, CallbackKind::StateChanged, ".uno:Bold=true"));

    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::ChildCommand { session_id: "s1".to_string(), command: "useractive".to_string() });

    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].session_id, "s1");
    assert!(String::from_utf8_lossy(&frames[0].bytes).contains(".uno:Bold"));
    Ok(())
}

#[test]
fn unknown_child_command_forwarded_to_engine_as_unocommand() -> anyhow::Result<()> {
    let (doc, _view_id) = wired_document()?;
    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::ChildCommand { session_id: "s1".to_string(), command: ".uno:Bold".to_string() });

    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert!(frames.is_empty());
    Ok(())
}

#[test]
fn render_failure_is_logged_and_discarded() -> anyhow::Result<()> {
    let doc = Arc::new(Document::new(
        "doc-1",
        Box::new({
            let mut e = FakeEngine::default();
            e.fail_paint = true;
            e
        }),
    ));
    doc.create_session(ChildSession::new("s1", "u1", "Alice"));
    let view_id = match doc.on_load("s1", "file:///doc.odt", None)? {
        crate::document::LoadOutcome::Loaded { view_id } => view_id,
        other => anyhow::bail!("{other:?}"),
    };

    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::Tile(tile(view_id, 0, 0)));
    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert!(frames.is_empty());
    Ok(())
}

#[test]
fn missing_session_is_logged_and_dropped() -> anyhow::Result<()> {
    let (doc, _view_id) = wired_document()?;
    let dispatcher = RenderDispatcher::new(doc.clone());
    doc.queue.put(Message::Tile(tile(999, 0, 0)));
    let frames = dispatcher.run_once().ok_or_else(|| anyhow::anyhow!("expected frames, got eof"))?;
    assert!(frames.is_empty());
    Ok(())
}

#[test]
fn eof_stops_the_loop() -> anyhow::Result<()> {
    let (doc, _view_id) = wired_document()?;
    doc.queue.put(Message::Eof);
    let dispatcher = RenderDispatcher::new(doc);
    assert!(dispatcher.run_once().is_none());
    Ok(())
}
