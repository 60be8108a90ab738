// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session memory of callback events needed to catch up a re-activated
//! client (§3 StateRecorder, §4.4).

use std::collections::HashMap;

use crate::callback::{CallbackKind, CallbackRecord, Invalidation};

/// The replay set accumulated while a session is inactive. Cleared after
/// [`StateRecorder::drain_replay`].
#[derive(Debug, Default)]
pub struct StateRecorder {
    /// Whole-document invalidation owed to the client on reactivate,
    /// replacing the accumulated invalidation stream.
    invalidate: bool,
    /// One latest payload per callback type (last-wins).
    recorded_events: HashMap<CallbackKind, CallbackRecord>,
    /// Per-peer-view last-wins, for callbacks whose view scoping is
    /// carried in the JSON payload rather than the callback's own view.
    recorded_view_events: HashMap<i32, HashMap<CallbackKind, CallbackRecord>>,
    /// Latest value of each UNO state (`.uno:Bold` -> full payload).
    recorded_states: HashMap<String, String>,
    /// Events where every occurrence matters (redline table changes,
    /// comments) — order preserved.
    recorded_events_vector: Vec<CallbackRecord>,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.invalidate
            && self.recorded_events.is_empty()
            && self.recorded_view_events.is_empty()
            && self.recorded_states.is_empty()
            && self.recorded_events_vector.is_empty()
    }

    /// Record one callback delivered while the session is inactive,
    /// applying the per-type policy of §4.4. Returns `false` if the
    /// callback must always be forwarded live regardless of activity
    /// (the `.uno:Save` exemption), in which case the caller should not
    /// have called this at all.
    pub fn record(&mut self, cb: &CallbackRecord) {
        debug_assert!(!cb.is_always_forwarded(), "save acknowledgements must bypass the recorder entirely");

        match cb.kind {
            CallbackKind::InvalidateTiles => {
                self.invalidate = true;
            }
            CallbackKind::StateChanged => {
                if let Some(command) = cb.uno_command() {
                    self.recorded_states.insert(command.to_string(), cb.payload.clone());
                }
            }
            k if k.is_ordered_event() => {
                self.recorded_events_vector.push(cb.clone());
            }
            k if k.is_cursor_family() => {
                if let Some(view_id) = cb.embedded_view_id() {
                    self.recorded_view_events.entry(view_id).or_default().insert(k, cb.clone());
                } else {
                    self.recorded_events.insert(k, cb.clone());
                }
            }
            _ => {
                // All others: drop while inactive.
            }
        }
    }

    /// Drain the recorder into the ordered replay sequence for
    /// reactivate: invalidation, per-view events, self events, states,
    /// then the ordered event vector. The recorder is empty afterward.
    pub fn drain_replay(&mut self, view_id: i32) -> Vec<CallbackRecord> {
        let mut out = Vec::new();

        if self.invalidate {
            out.push(CallbackRecord::new(
                view_id,
                CallbackKind::InvalidateTiles,
                Invalidation::whole_part(0, 0).to_payload(),
            ));
        }

        for (_, by_kind) in self.recorded_view_events.drain() {
            out.extend(by_kind.into_values());
        }

        out.extend(self.recorded_events.drain().map(|(_, v)| v));

        for (_, payload) in self.recorded_states.drain() {
            out.push(CallbackRecord::new(view_id, CallbackKind::StateChanged, payload));
        }

        out.append(&mut self.recorded_events_vector);

        self.invalidate = false;
        out
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
