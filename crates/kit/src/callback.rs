// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback kinds emitted by the document engine, and the coalescing class
//! each one belongs to.

use serde::{Deserialize, Serialize};

/// The closed enumeration of engine callback kinds the core understands.
/// `Other` carries any kind the core does not specifically coalesce but
/// still must queue, route, and (if the session is inactive) drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackKind {
    InvalidateTiles,
    StateChanged,
    InvalidateVisibleCursor,
    CursorVisible,
    CellCursor,
    ViewCursor,
    ViewCellCursor,
    ViewCursorVisible,
    DocumentSizeChanged,
    StatusIndicatorSetValue,
    RedlineTableSizeChanged,
    RedlineTableEntryModified,
    Comment,
    UnoCommandResult,
    Other(u32),
}

impl CallbackKind {
    /// The cursor/selection family that coalesces last-wins per `(view,
    /// type)` and, for view-scoped variants, also per the `view_id`
    /// embedded in the payload.
    pub fn is_cursor_family(self) -> bool {
        matches!(
            self,
            CallbackKind::InvalidateVisibleCursor
                | CallbackKind::CursorVisible
                | CallbackKind::CellCursor
                | CallbackKind::ViewCursor
                | CallbackKind::ViewCellCursor
                | CallbackKind::ViewCursorVisible
                | CallbackKind::DocumentSizeChanged
                | CallbackKind::StatusIndicatorSetValue
        )
    }

    /// Variants whose view-scoping is carried in the JSON payload (as
    /// opposed to being purely identified by the callback's own `view`
    /// field).
    pub fn is_view_scoped(self) -> bool {
        matches!(
            self,
            CallbackKind::ViewCursor
                | CallbackKind::ViewCellCursor
                | CallbackKind::ViewCursorVisible
        )
    }

    /// Callbacks for which every occurrence matters and order must be
    /// preserved (never coalesced, appended to the ordered event vector
    /// while a session is inactive).
    pub fn is_ordered_event(self) -> bool {
        matches!(
            self,
            CallbackKind::RedlineTableSizeChanged
                | CallbackKind::RedlineTableEntryModified
                | CallbackKind::Comment
        )
    }
}

/// A callback record: `(view_id, type, payload)`. `view_id == -1` is a
/// broadcast to all sessions of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRecord {
    pub view_id: i32,
    pub kind: CallbackKind,
    pub payload: String,
}

impl CallbackRecord {
    pub const BROADCAST: i32 = -1;

    pub fn new(view_id: i32, kind: CallbackKind, payload: impl Into<String>) -> Self {
        Self { view_id, kind, payload: payload.into() }
    }

    pub fn is_broadcast(&self) -> bool {
        self.view_id == Self::BROADCAST
    }

    /// Parse the `.uno:Command` prefix up to `=`, for `StateChanged`
    /// payloads of the form `.uno:Bold=true`.
    pub fn uno_command(&self) -> Option<&str> {
        if self.kind != CallbackKind::StateChanged {
            return None;
        }
        self.payload.split('=').next()
    }

    pub fn is_modified_status(&self) -> bool {
        self.uno_command() == Some(".uno:ModifiedStatus")
    }

    /// Extract a foreign `viewId` embedded in a JSON payload, for the
    /// view-scoped cursor/selection callbacks.
    pub fn embedded_view_id(&self) -> Option<i32> {
        if !self.kind.is_view_scoped() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(&self.payload).ok()?;
        value.get("viewId").and_then(|v| v.as_str()).and_then(|s| s.parse().ok())
    }

    /// Whether this callback must always be forwarded live, even to an
    /// inactive session — save acknowledgements must not be lost.
    pub fn is_always_forwarded(&self) -> bool {
        self.kind == CallbackKind::UnoCommandResult && self.payload.contains(".uno:Save")
    }
}

/// `(x, y, width, height, part, mode)` in document coordinates, used for
/// `invalidate_tiles` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    pub rect: crate::tile::Rect,
    pub part: i32,
    pub mode: i32,
}

impl Invalidation {
    pub fn whole_part(part: i32, mode: i32) -> Self {
        Self { rect: crate::tile::Rect::whole_part(), part, mode }
    }

    pub fn to_payload(self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}",
            self.rect.x, self.rect.y, self.rect.width, self.rect.height, self.part, self.mode
        )
    }

    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.split(',').map(|s| s.trim());
        let x: i64 = parts.next()?.parse().ok()?;
        let y: i64 = parts.next()?.parse().ok()?;
        let width: i64 = parts.next()?.parse().ok()?;
        let height: i64 = parts.next()?.parse().ok()?;
        let part: i32 = parts.next()?.parse().ok()?;
        let mode: i32 = parts.next().unwrap_or("0").parse().unwrap_or(0);
        Some(Self { rect: crate::tile::Rect::new(x, y, width, height), part, mode })
    }
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
