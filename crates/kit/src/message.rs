// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged message variants crossing the queue boundary.
//!
//! The original protocol re-parses whitespace-delimited strings at every
//! layer (see `examples/original_source/common/Message.hpp`). Per the
//! REDESIGN FLAGS in spec.md §9, the queue boundary here uses a proper
//! tagged enum instead: coalescing rules become pattern matches on
//! variants rather than repeated tokenizing of the same string.

use crate::callback::CallbackRecord;
use crate::tile::{TileCombined, TileDesc};

/// The kind of an opaque client control message, tracked only so
/// text-input merging (§4.1.2) can recognize "interfering" messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Key,
    Mouse,
    WindowKey,
    Other,
}

impl ControlKind {
    pub fn from_first_token(token: &str) -> Self {
        match token {
            "key" => ControlKind::Key,
            "mouse" => ControlKind::Mouse,
            "windowkey" => ControlKind::WindowKey,
            _ => ControlKind::Other,
        }
    }
}

/// One message flowing through [`crate::tile_queue::TileQueue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A single tile render request.
    Tile(TileDesc),
    /// A batch of tiles combined by the dispatcher at dequeue time
    /// (never enqueued directly — `tilecombine` is split into
    /// constituent `Tile`s at ingress per §4.1).
    TileBatch(TileCombined),
    /// A callback emitted by the document engine.
    Callback(CallbackRecord),
    /// `textinput id=ID text=T`, scoped to a view.
    TextInput { view_id: i32, id: u64, text: String },
    /// `removetextcontext id=ID before=B after=A`, scoped to a view.
    RemoveTextContext { view_id: i32, id: u64, before: u64, after: u64 },
    /// A `child-<sessionid>` prefixed message bound for a specific session.
    ChildCommand { session_id: String, command: String },
    /// Any other client control message (key, mouse, windowkey, uno
    /// commands, ...), appended verbatim.
    Control { kind: ControlKind, view_id: i32, payload: String },
    /// Queue termination sentinel.
    Eof,
}

impl Message {
    /// Whether this message, if it sits between two textinput/
    /// removetextcontext messages of the same view, blocks merging them.
    pub fn interferes_with_input_merge(&self) -> bool {
        match self {
            Message::Control { kind, .. } => {
                matches!(kind, ControlKind::Key | ControlKind::Mouse | ControlKind::WindowKey)
            }
            Message::TextInput { .. } | Message::RemoveTextContext { .. } => true,
            _ => false,
        }
    }

    pub fn view_id(&self) -> Option<i32> {
        match self {
            Message::Tile(t) => Some(t.nviewid),
            Message::Callback(c) => Some(c.view_id),
            Message::TextInput { view_id, .. }
            | Message::RemoveTextContext { view_id, .. }
            | Message::Control { view_id, .. } => Some(*view_id),
            Message::ChildCommand { .. } | Message::Eof | Message::TileBatch(_) => None,
        }
    }

    pub fn is_tile(&self) -> bool {
        matches!(self, Message::Tile(_))
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
