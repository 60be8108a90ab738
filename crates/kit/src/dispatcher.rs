// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-document dispatcher thread (§4.3): pops messages off the
//! [`TileQueue`](crate::tile_queue::TileQueue) and turns them into outbound
//! frames, painting and encoding tiles, routing callbacks, and forwarding
//! `child-<sessionid>` commands.
//!
//! The core never owns a transport (§1): [`RenderDispatcher::run`] logs and
//! drops the frames it produces; a real process wires [`RoutedFrame`]s to
//! whatever owns each session's socket.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::callback::CallbackRecord;
use crate::document::Document;
use crate::error::KitError;
use crate::message::Message;
use crate::png_cache::PngCache;
use crate::tile::{TileCombined, TileDesc};
use crate::wire::{encode_tile_combined_frame, encode_tile_frame};

/// One outbound frame addressed to a session's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedFrame {
    pub session_id: String,
    pub bytes: Vec<u8>,
}

/// Runs the §4.3 dispatch loop for one document.
pub struct RenderDispatcher {
    document: Arc<Document>,
    png_cache: Mutex<PngCache>,
}

impl RenderDispatcher {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document, png_cache: Mutex::new(PngCache::default()) }
    }

    pub fn with_cache_budget(document: Arc<Document>, budget_bytes: u64) -> Self {
        Self { document, png_cache: Mutex::new(PngCache::new(budget_bytes)) }
    }

    /// Pop and dispatch one message. Returns `None` on `eof`, signaling the
    /// caller to stop; otherwise the (possibly empty) set of outbound
    /// frames the message produced.
    pub fn run_once(&self) -> Option<Vec<RoutedFrame>> {
        let msg = self.document.queue.pop();
        if matches!(msg, Message::Eof) {
            return None;
        }
        Some(self.dispatch(msg))
    }

    /// Loop [`Self::run_once`] until `eof`. The core has no transport, so
    /// frames are logged at trace level and dropped; embed `RenderDispatcher`
    /// in a process that forwards `RoutedFrame`s to real sockets instead.
    pub fn run(&self) {
        while let Some(frames) = self.run_once() {
            for frame in frames {
                trace!(session = %frame.session_id, bytes = frame.bytes.len(), "frame dispatched");
            }
        }
    }

    fn dispatch(&self, msg: Message) -> Vec<RoutedFrame> {
        match msg {
            Message::Tile(tile) => self.dispatch_tile(tile),
            Message::TileBatch(batch) => self.dispatch_tile_batch(batch),
            Message::Callback(cb) => self.dispatch_callback(&cb),
            Message::ChildCommand { session_id, command } => self.dispatch_child_command(session_id, command),
            Message::Eof => Vec::new(),
            other => {
                debug!(?other, "dispatcher: dropped message with no dispatch rule");
                Vec::new()
            }
        }
    }

    fn dispatch_tile(&self, tile: TileDesc) -> Vec<RoutedFrame> {
        let Some(session_id) = self.session_for_view(tile.nviewid) else {
            warn!(view = tile.nviewid, "tile dispatch: session not found, dropping");
            return Vec::new();
        };
        match self.paint_and_encode(&tile) {
            Ok(png) => vec![RoutedFrame { session_id, bytes: encode_tile_frame(&tile, &png) }],
            Err(err) => {
                warn!(error = %err, "tile render failed, discarding");
                Vec::new()
            }
        }
    }

    /// Splits the batch by requesting view, since a combined batch may hold
    /// tiles from more than one session's `tilecombine`, then paints and
    /// routes each group's frame independently.
    fn dispatch_tile_batch(&self, batch: TileCombined) -> Vec<RoutedFrame> {
        let mut by_view: HashMap<i32, Vec<TileDesc>> = HashMap::new();
        for tile in batch.tiles {
            by_view.entry(tile.nviewid).or_default().push(tile);
        }

        let mut out = Vec::new();
        for (view_id, tiles) in by_view {
            let Some(session_id) = self.session_for_view(view_id) else {
                warn!(view = view_id, "tilecombine dispatch: session not found, dropping");
                continue;
            };

            let mut pngs = Vec::with_capacity(tiles.len());
            let mut failed = false;
            for tile in &tiles {
                match self.paint_and_encode(tile) {
                    Ok(png) => pngs.push(png),
                    Err(err) => {
                        warn!(error = %err, "tilecombine render failed, discarding batch");
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                continue;
            }
            out.push(RoutedFrame { session_id, bytes: encode_tile_combined_frame(&tiles, &pngs) });
        }
        out
    }

    fn paint_and_encode(&self, tile: &TileDesc) -> Result<Vec<u8>, KitError> {
        let pixmap = self.document.with_engine(|engine| {
            engine.set_view(tile.nviewid);
            engine.paint_part_tile(
                tile.part,
                tile.pixel_width as u32,
                tile.pixel_height as u32,
                tile.tile_pos_x,
                tile.tile_pos_y,
                tile.tile_width,
                tile.tile_height,
            )
        })?;
        self.png_cache.lock().encode(&pixmap.rgba, pixmap.width, pixmap.height)
    }

    fn dispatch_callback(&self, cb: &CallbackRecord) -> Vec<RoutedFrame> {
        self.document
            .route_callback(cb)
            .into_iter()
            .map(|(session_id, frame)| RoutedFrame { session_id, bytes: frame.0.into_bytes() })
            .collect()
    }

    /// `child-<sessionid>` commands recognized here: `useractive`/
    /// `userinactive` drive session state directly; anything else is
    /// forwarded to the engine as a uno command (§4.3).
    fn dispatch_child_command(&self, session_id: String, command: String) -> Vec<RoutedFrame> {
        let Some(first) = command.split_whitespace().next() else {
            return Vec::new();
        };
        match first {
            "useractive" => self
                .document
                .activate_session(&session_id)
                .into_iter()
                .map(|frame| RoutedFrame { session_id: session_id.clone(), bytes: frame.0.into_bytes() })
                .collect(),
            "userinactive" => {
                self.document.deactivate_session(&session_id);
                Vec::new()
            }
            other => {
                self.document.with_engine(|engine| engine.post_unocommand(other, &command, true));
                Vec::new()
            }
        }
    }

    fn session_for_view(&self, view_id: i32) -> Option<String> {
        self.document
            .with_sessions(|sessions| sessions.values().find(|s| s.view_id == view_id).map(|s| s.session_id.clone()))
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
