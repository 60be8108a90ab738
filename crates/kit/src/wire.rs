// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Textual wire grammar (§6.1): parsing inbound client lines into
//! [`Message`], and encoding outbound frames.
//!
//! Tokenization follows the original protocol's whitespace-delimited,
//! `key=value` style (`examples/original_source/common/Message.hpp`,
//! `Protocol.cpp`'s `getTokenInteger`/`getTokenString`), but produces the
//! tagged [`Message`] enum at the boundary instead of re-parsing strings
//! downstream, per the REDESIGN FLAGS in spec.md §9.

use crate::callback::{CallbackKind, CallbackRecord};
use crate::error::KitError;
use crate::message::{ControlKind, Message};
use crate::tile::TileDesc;

/// The result of parsing one inbound client line: either a message to
/// enqueue, or an immediate action the queue applies without enqueuing
/// anything (`canceltiles` is never itself queued, per §4.1).
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Enqueue(Message),
    /// `tilecombine` splits into one `tile` enqueue per constituent (§4.1).
    EnqueueMany(Vec<Message>),
    CancelTiles(Vec<u64>),
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    tokens(line).find_map(|tok| tok.strip_prefix(key)?.strip_prefix('='))
}

fn field_parse<T: std::str::FromStr>(line: &str, key: &str) -> Option<T> {
    field(line, key)?.parse().ok()
}

/// Parse one inbound client line into an [`Inbound`] action.
pub fn parse_inbound(line: &str) -> Result<Inbound, KitError> {
    if line.is_empty() {
        return Err(KitError::protocol("parse", "empty message"));
    }
    let Some(first) = tokens(line).next() else {
        return Err(KitError::protocol("parse", "blank message"));
    };

    match first {
        "canceltiles" => {
            let versions = line[first.len()..]
                .split_whitespace()
                .next()
                .unwrap_or("")
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            Ok(Inbound::CancelTiles(versions))
        }
        "tile" => parse_tile(line).map(Message::Tile).map(Inbound::Enqueue),
        "tilecombine" => {
            parse_tile_combine_all(line).map(|tiles| Inbound::EnqueueMany(tiles.into_iter().map(Message::Tile).collect()))
        }
        "textinput" => {
            let view_id = field_parse(line, "nviewid").unwrap_or(-1);
            let id = field_parse(line, "id").ok_or_else(|| KitError::protocol("textinput", "missing id"))?;
            let text = field(line, "text").unwrap_or("").to_string();
            Ok(Inbound::Enqueue(Message::TextInput { view_id, id, text }))
        }
        "removetextcontext" => {
            let view_id = field_parse(line, "nviewid").unwrap_or(-1);
            let id = field_parse(line, "id").ok_or_else(|| KitError::protocol("removetextcontext", "missing id"))?;
            let before = field_parse(line, "before").unwrap_or(0);
            let after = field_parse(line, "after").unwrap_or(0);
            Ok(Inbound::Enqueue(Message::RemoveTextContext { view_id, id, before, after }))
        }
        "callback" => Err(KitError::protocol("callback", "callbacks must not originate from a client")),
        "eof" => Ok(Inbound::Enqueue(Message::Eof)),
        other if other.starts_with("child-") => {
            let session_id = other.trim_start_matches("child-").to_string();
            let command = line[first.len()..].trim_start().to_string();
            Ok(Inbound::Enqueue(Message::ChildCommand { session_id, command }))
        }
        other => {
            let kind = ControlKind::from_first_token(other);
            let view_id = field_parse(line, "nviewid").unwrap_or(-1);
            Ok(Inbound::Enqueue(Message::Control { kind, view_id, payload: line.to_string() }))
        }
    }
}

fn parse_tile(line: &str) -> Result<TileDesc, KitError> {
    let missing = |f: &str| KitError::protocol("tile", format!("missing {f}"));
    Ok(TileDesc {
        part: field_parse(line, "part").ok_or_else(|| missing("part"))?,
        edit_mode: field_parse(line, "mode").unwrap_or(0),
        tile_pos_x: field_parse(line, "tileposx").ok_or_else(|| missing("tileposx"))?,
        tile_pos_y: field_parse(line, "tileposy").ok_or_else(|| missing("tileposy"))?,
        tile_width: field_parse(line, "tilewidth").ok_or_else(|| missing("tilewidth"))?,
        tile_height: field_parse(line, "tileheight").ok_or_else(|| missing("tileheight"))?,
        pixel_width: field_parse(line, "width").ok_or_else(|| missing("width"))?,
        pixel_height: field_parse(line, "height").ok_or_else(|| missing("height"))?,
        version: field_parse(line, "ver").unwrap_or(0),
        id: field_parse(line, "id"),
        nviewid: field_parse(line, "nviewid").unwrap_or(-1),
    })
}

/// Split a `tilecombine` line into its constituent `tile` requests, one
/// per comma-separated `tileposx`/`tileposy` pair.
pub fn parse_tile_combine_all(line: &str) -> Result<Vec<TileDesc>, KitError> {
    let missing = |f: &str| KitError::protocol("tilecombine", format!("missing {f}"));
    let part = field_parse(line, "part").ok_or_else(|| missing("part"))?;
    let edit_mode = field_parse(line, "mode").unwrap_or(0);
    let tile_width = field_parse(line, "tilewidth").ok_or_else(|| missing("tilewidth"))?;
    let tile_height = field_parse(line, "tileheight").ok_or_else(|| missing("tileheight"))?;
    let pixel_width = field_parse(line, "width").ok_or_else(|| missing("width"))?;
    let pixel_height = field_parse(line, "height").ok_or_else(|| missing("height"))?;
    let nviewid = field_parse(line, "nviewid").unwrap_or(-1);

    let xs: Vec<i64> = field(line, "tileposx").ok_or_else(|| missing("tileposx"))?.split(',').filter_map(|s| s.parse().ok()).collect();
    let ys: Vec<i64> = field(line, "tileposy").ok_or_else(|| missing("tileposy"))?.split(',').filter_map(|s| s.parse().ok()).collect();
    if xs.len() != ys.len() || xs.is_empty() {
        return Err(KitError::protocol("tilecombine", "tileposx/tileposy length mismatch"));
    }
    let versions: Vec<u64> = field(line, "ver").map(|v| v.split(',').filter_map(|s| s.parse().ok()).collect()).unwrap_or_default();

    Ok(xs
        .into_iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (tile_pos_x, tile_pos_y))| TileDesc {
            part,
            edit_mode,
            tile_pos_x,
            tile_pos_y,
            tile_width,
            tile_height,
            pixel_width,
            pixel_height,
            version: versions.get(i).copied().unwrap_or(0),
            id: None,
            nviewid,
        })
        .collect())
}

/// Encode a single rendered tile as one outbound binary frame: an ASCII
/// header line followed immediately by the PNG byte stream.
pub fn encode_tile_frame(tile: &TileDesc, png: &[u8]) -> Vec<u8> {
    let header = format!(
        "tile: part={} width={} height={} tileposx={} tileposy={} tilewidth={} tileheight={} ver={}\n",
        tile.part, tile.pixel_width, tile.pixel_height, tile.tile_pos_x, tile.tile_pos_y, tile.tile_width, tile.tile_height, tile.version
    );
    let mut frame = header.into_bytes();
    frame.extend_from_slice(png);
    frame
}

/// Encode a combined batch of rendered tiles as one outbound binary
/// frame: a header naming each constituent's byte size, followed by the
/// concatenated PNG streams.
pub fn encode_tile_combined_frame(tiles: &[TileDesc], pngs: &[Vec<u8>]) -> Vec<u8> {
    let sizes = pngs.iter().map(|p| p.len().to_string()).collect::<Vec<_>>().join(",");
    let positions_x = tiles.iter().map(|t| t.tile_pos_x.to_string()).collect::<Vec<_>>().join(",");
    let positions_y = tiles.iter().map(|t| t.tile_pos_y.to_string()).collect::<Vec<_>>().join(",");
    let header = format!("tilecombine: tileposx={positions_x} tileposy={positions_y} imgsize={sizes}\n");
    let mut frame = header.into_bytes();
    for png in pngs {
        frame.extend_from_slice(png);
    }
    frame
}

/// Encode one callback as an outbound text frame: `<name>: <payload>`.
pub fn encode_callback_frame(cb: &CallbackRecord) -> String {
    format!("{}: {}", callback_name(cb.kind), cb.payload)
}

fn callback_name(kind: CallbackKind) -> &'static str {
    match kind {
        CallbackKind::InvalidateTiles => "invalidatetiles",
        CallbackKind::StateChanged => "statechanged",
        CallbackKind::InvalidateVisibleCursor => "invalidatevisiblecursor",
        CallbackKind::CursorVisible => "cursorvisible",
        CallbackKind::CellCursor => "cellcursor",
        CallbackKind::ViewCursor => "viewcursorvisible",
        CallbackKind::ViewCellCursor => "viewcellcursor",
        CallbackKind::ViewCursorVisible => "viewcursorvisible",
        CallbackKind::DocumentSizeChanged => "documentsizechanged",
        CallbackKind::StatusIndicatorSetValue => "statusindicatorsetvalue",
        CallbackKind::RedlineTableSizeChanged => "redlinetablesizechanged",
        CallbackKind::RedlineTableEntryModified => "redlinetableentrymodified",
        CallbackKind::Comment => "comment",
        CallbackKind::UnoCommandResult => "unocommandresult",
        CallbackKind::Other(_) => "callback",
    }
}

/// A single entry in the `viewinfo:` broadcast (§4.6 `notify_view_info`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ViewInfoEntry {
    pub id: i32,
    pub userid: String,
    pub username: String,
    pub color: String,
}

pub fn encode_view_info_frame(views: &[ViewInfoEntry]) -> String {
    format!("viewinfo: {}", serde_json::to_string(views).unwrap_or_else(|_| "[]".to_string()))
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
