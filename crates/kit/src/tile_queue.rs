// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ingress-coalescing, priority-dispatching specialization of
//! [`MessageQueue`]: recognizes tile, callback, textinput and
//! removetextcontext messages and applies the coalescing and priority
//! rules from spec.md §4.1–§4.2.

use std::collections::VecDeque;

use crate::callback::{CallbackKind, CallbackRecord, Invalidation};
use crate::cursor::CursorTracker;
use crate::message::Message;
use crate::queue::{MessageQueue, QueueInner};
use crate::tile::{Rect, TileCombined, TileDesc};

/// The "reasonable" budget an invalidation merge must fit within:
/// ≤ 4×3840 wide, ≤ 2×3840 tall.
#[derive(Debug, Clone, Copy)]
pub struct MergeBudget {
    pub max_width: i64,
    pub max_height: i64,
}

impl Default for MergeBudget {
    fn default() -> Self {
        Self { max_width: 4 * 3840, max_height: 2 * 3840 }
    }
}

pub struct TileQueue {
    queue: MessageQueue<CursorTracker>,
    merge_budget: MergeBudget,
}

impl Default for TileQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TileQueue {
    pub fn new() -> Self {
        Self { queue: MessageQueue::new(CursorTracker::new()), merge_budget: MergeBudget::default() }
    }

    pub fn with_merge_budget(merge_budget: MergeBudget) -> Self {
        Self { queue: MessageQueue::new(CursorTracker::new()), merge_budget }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Enqueue one message after applying ingress coalescing (§4.1).
    pub fn put(&self, msg: Message) {
        match msg {
            Message::Tile(tile) => self.put_tile(tile),
            Message::Callback(cb) => self.put_callback_record(cb),
            Message::TextInput { view_id, id, text } => self.put_text_input(view_id, id, text),
            Message::RemoveTextContext { view_id, id, before, after } => {
                self.put_remove_text_context(view_id, id, before, after)
            }
            other => self.queue.with_locked(|inner| inner.items.push_back(other)),
        }
    }

    /// Enqueue a callback emitted by the document engine, applying the
    /// callback-coalescing rules of §4.1.1.
    pub fn put_callback(&self, view_id: i32, kind: CallbackKind, payload: impl Into<String>) {
        self.put_callback_record(CallbackRecord::new(view_id, kind, payload));
    }

    /// `canceltiles ver1,ver2,...`: drop all queued tiles whose version is
    /// listed, except previews.
    pub fn cancel_tiles(&self, versions: &[u64]) {
        self.queue.with_locked(|inner| {
            inner.items.retain(|m| match m {
                Message::Tile(t) => t.is_preview() || !versions.contains(&t.version),
                _ => true,
            });
        });
    }

    pub fn update_cursor(&self, view_id: i32, part: i32, rect: Rect) {
        self.queue.with_locked(|inner| inner.aux.update(view_id, part, rect));
    }

    pub fn remove_cursor(&self, view_id: i32) {
        self.queue.with_locked(|inner| inner.aux.remove(view_id));
    }

    /// Blocking dequeue implementing the dispatch priority of §4.2.
    pub fn pop(&self) -> Message {
        self.queue.wait_until(|inner| self.try_pop(inner))
    }

    /// Human-readable listing of queued message kinds and counts, used
    /// only for logging/diagnostics (mirrors `KitQueue::dumpState`).
    pub fn debug_dump(&self) -> String {
        self.queue.peek_locked(|inner| {
            let mut tiles = 0usize;
            let mut previews = 0usize;
            let mut callbacks = 0usize;
            let mut other = 0usize;
            for m in &inner.items {
                match m {
                    Message::Tile(t) if t.is_preview() => previews += 1,
                    Message::Tile(_) => tiles += 1,
                    Message::Callback(_) => callbacks += 1,
                    _ => other += 1,
                }
            }
            format!(
                "queue: {} tiles, {} previews, {} callbacks, {} other ({} total)",
                tiles,
                previews,
                callbacks,
                other,
                inner.items.len()
            )
        })
    }

    // -- ingress rules ---------------------------------------------------

    fn put_tile(&self, tile: TileDesc) {
        self.queue.with_locked(|inner| {
            if !tile.is_preview() {
                let key = tile.key();
                inner
                    .items
                    .retain(|m| !matches!(m, Message::Tile(existing) if !existing.is_preview() && existing.key() == key));
            }
            inner.items.push_back(Message::Tile(tile));
        });
    }

    fn put_callback_record(&self, cb: CallbackRecord) {
        self.queue.with_locked(|inner| {
            let merged = coalesce_callback(&mut inner.items, cb, self.merge_budget);
            if let Some(merged) = merged {
                inner.items.push_back(Message::Callback(merged));
            }
        });
    }

    fn put_text_input(&self, view_id: i32, id: u64, text: String) {
        self.queue.with_locked(|inner| {
            if !merge_text_input(&mut inner.items, view_id, id, &text) {
                inner.items.push_back(Message::TextInput { view_id, id, text });
            }
        });
    }

    fn put_remove_text_context(&self, view_id: i32, id: u64, before: u64, after: u64) {
        self.queue.with_locked(|inner| {
            if !merge_remove_text_context(&mut inner.items, view_id, id, before, after) {
                inner.items.push_back(Message::RemoveTextContext { view_id, id, before, after });
            }
        });
    }

    // -- dispatch priority -------------------------------------------------

    fn try_pop(&self, inner: &mut QueueInner<CursorTracker>) -> Option<Message> {
        match inner.items.front()? {
            Message::Tile(t) if t.is_preview() => {
                let head = inner.items.pop_front();
                rotate_previews_to_back(&mut inner.items);
                head
            }
            Message::Tile(_) => {
                let best_idx = select_best_tile_index(inner)?;
                let Some(Message::Tile(chosen)) = inner.items.remove(best_idx) else {
                    unreachable!("select_best_tile_index only returns indices of non-preview Tile messages")
                };
                Some(combine_with_compatible(inner, chosen))
            }
            _ => inner.items.pop_front(),
        }
    }
}

fn select_best_tile_index(inner: &QueueInner<CursorTracker>) -> Option<usize> {
    let ceiling = inner.aux.max_priority();
    let mut best_idx = None;
    let mut best_priority = i64::MIN;
    for (i, m) in inner.items.iter().enumerate() {
        if let Message::Tile(t) = m {
            if t.is_preview() {
                continue;
            }
            let priority = inner.aux.priority_of(t.part, &t.doc_rect());
            if best_idx.is_none() || priority > best_priority {
                best_priority = priority;
                best_idx = Some(i);
                if priority >= ceiling {
                    break;
                }
            }
        }
    }
    best_idx
}

fn combine_with_compatible(inner: &mut QueueInner<CursorTracker>, chosen: TileDesc) -> Message {
    let class = chosen.combine_class();
    let mut combined = TileCombined::new(class);
    combined.push_dedup(chosen);

    let mut i = 0;
    while i < inner.items.len() {
        let matches_class =
            matches!(&inner.items[i], Message::Tile(t) if !t.is_preview() && t.combine_class() == class);
        if matches_class {
            if let Some(Message::Tile(t)) = inner.items.remove(i) {
                combined.push_dedup(t);
            }
            continue;
        }
        i += 1;
    }

    if combined.tiles.len() == 1 {
        Message::Tile(combined.tiles.remove(0))
    } else {
        Message::TileBatch(combined)
    }
}

fn rotate_previews_to_back(items: &mut VecDeque<Message>) {
    let mut previews = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if matches!(&items[i], Message::Tile(t) if t.is_preview()) {
            if let Some(m) = items.remove(i) {
                previews.push(m);
            }
        } else {
            i += 1;
        }
    }
    items.extend(previews);
}

// -- callback coalescing (§4.1.1) -----------------------------------------

fn coalesce_callback(
    items: &mut VecDeque<Message>,
    cb: CallbackRecord,
    budget: MergeBudget,
) -> Option<CallbackRecord> {
    match cb.kind {
        CallbackKind::InvalidateTiles => Some(coalesce_invalidate_tiles(items, cb, budget)),
        CallbackKind::StateChanged if !cb.is_modified_status() => {
            coalesce_state_changed(items, &cb);
            Some(cb_after_state_removed(items, cb))
        }
        k if k.is_cursor_family() => {
            coalesce_cursor_family(items, &cb);
            Some(cb)
        }
        _ => Some(cb),
    }
}

/// Placeholder to keep `coalesce_callback`'s state-changed arm simple:
/// the removal already happened against the queue, so the record to
/// enqueue is just the incoming one.
fn cb_after_state_removed(_items: &VecDeque<Message>, cb: CallbackRecord) -> CallbackRecord {
    cb
}

fn coalesce_invalidate_tiles(items: &mut VecDeque<Message>, cb: CallbackRecord, budget: MergeBudget) -> CallbackRecord {
    let Some(mut inv) = Invalidation::parse(&cb.payload) else {
        return cb;
    };

    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < items.len() {
            let existing_inv = match &items[i] {
                Message::Callback(existing)
                    if existing.view_id == cb.view_id && existing.kind == CallbackKind::InvalidateTiles =>
                {
                    Invalidation::parse(&existing.payload)
                }
                _ => None,
            };
            let Some(existing_inv) = existing_inv else {
                i += 1;
                continue;
            };
            if existing_inv.part != inv.part || existing_inv.mode != inv.mode {
                i += 1;
                continue;
            }
            if existing_inv.rect.contained_in(&inv.rect) {
                items.remove(i);
                continue;
            }
            if existing_inv.rect.intersects(&inv.rect) {
                let union = existing_inv.rect.union(&inv.rect);
                if union.width <= budget.max_width && union.height <= budget.max_height {
                    inv.rect = union;
                    items.remove(i);
                    merged_any = true;
                    continue;
                }
            }
            i += 1;
        }
        if !merged_any {
            break;
        }
    }

    CallbackRecord::new(cb.view_id, CallbackKind::InvalidateTiles, inv.to_payload())
}

/// Remove any prior queued `StateChanged` for the same uno command and
/// view. `.uno:ModifiedStatus` is handled by the caller (never coalesced).
fn coalesce_state_changed(items: &mut VecDeque<Message>, cb: &CallbackRecord) {
    let Some(command) = cb.uno_command() else {
        return;
    };
    items.retain(|m| match m {
        Message::Callback(existing)
            if existing.view_id == cb.view_id && existing.kind == CallbackKind::StateChanged =>
        {
            existing.uno_command() != Some(command) || existing.is_modified_status()
        }
        _ => true,
    });
}

/// Last-wins per `(view, type)`, and for view-scoped variants also per
/// the `view_id` embedded in the JSON payload.
fn coalesce_cursor_family(items: &mut VecDeque<Message>, cb: &CallbackRecord) {
    let embedded = cb.embedded_view_id();
    items.retain(|m| match m {
        Message::Callback(existing) if existing.view_id == cb.view_id && existing.kind == cb.kind => {
            if cb.kind.is_view_scoped() {
                existing.embedded_view_id() != embedded
            } else {
                false
            }
        }
        _ => true,
    });
}

// -- text-input merging (§4.1.2) ------------------------------------------

fn merge_text_input(items: &mut VecDeque<Message>, view_id: i32, id: u64, text: &str) -> bool {
    for i in (0..items.len()).rev() {
        let is_match = matches!(&items[i], Message::TextInput { view_id: v, id: existing_id, .. } if *v == view_id && *existing_id == id);
        if is_match {
            if let Message::TextInput { text: existing_text, .. } = &mut items[i] {
                existing_text.push_str(text);
            }
            return true;
        }
        if items[i].interferes_with_input_merge() {
            return false;
        }
    }
    false
}

fn merge_remove_text_context(
    items: &mut VecDeque<Message>,
    view_id: i32,
    id: u64,
    before: u64,
    after: u64,
) -> bool {
    for i in (0..items.len()).rev() {
        let is_match = matches!(&items[i], Message::RemoveTextContext { view_id: v, id: existing_id, .. } if *v == view_id && *existing_id == id);
        if is_match {
            if let Message::RemoveTextContext { before: b, after: a, .. } = &mut items[i] {
                *b += before;
                *a += after;
            }
            return true;
        }
        if items[i].interferes_with_input_merge() {
            return false;
        }
    }
    false
}

#[cfg(test)]
#[path = "tile_queue_tests.rs"]
mod tests;
