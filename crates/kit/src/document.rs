// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-document aggregator: owns the engine handle, the queue, and the
//! sessions map (§4.6).
//!
//! Lock order, per §5: sessions → document → queue. `Document` exposes
//! only methods that respect this order; nothing here calls the engine
//! while holding the queue lock, or the reverse.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::engine::{DocumentEngine, PasswordOutcome};
use crate::error::KitError;
use crate::message::Message;
use crate::session::{ChildSession, OutboundFrame};
use crate::tile_queue::TileQueue;
use crate::wire::{encode_view_info_frame, ViewInfoEntry};

/// Outcome of [`Document::on_load`], mirroring the §6.1 `error: cmd=load
/// kind=...` vocabulary for the authorization path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { view_id: i32 },
    PasswordRequiredToView,
    PasswordRequiredToModify,
    WrongPassword,
}

/// One document: the engine handle, the message/tile queue, and the
/// session map. Created on the first session's attach, destroyed when
/// the last session leaves.
pub struct Document {
    pub doc_id: String,
    engine: Mutex<Box<dyn DocumentEngine>>,
    pub queue: TileQueue,
    sessions: Mutex<HashMap<String, ChildSession>>,
    /// `view_id -> (user_id, user_name)`, kept after a session leaves so
    /// `viewinfo` broadcasts remain stable for sessions that reconnect
    /// while their peer's view is gone (§4.6 `on_unload`).
    view_tombstones: Mutex<HashMap<i32, (String, String)>>,
    uri_loaded: Mutex<bool>,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, engine: Box<dyn DocumentEngine>) -> Self {
        Self {
            doc_id: doc_id.into(),
            engine: Mutex::new(engine),
            queue: TileQueue::new(),
            sessions: Mutex::new(HashMap::new()),
            view_tombstones: Mutex::new(HashMap::new()),
            uri_loaded: Mutex::new(false),
        }
    }

    /// Idempotent: a second call with the same id is a no-op success.
    pub fn create_session(&self, session: ChildSession) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&session.session_id) {
            return true;
        }
        info!(doc = %self.doc_id, session = %session.session_id, "session created");
        sessions.insert(session.session_id.clone(), session);
        true
    }

    /// Serializes document loading: only the first caller opens the
    /// engine document; later callers create a new view into it.
    pub fn on_load(
        &self,
        session_id: &str,
        uri: &str,
        password: Option<&str>,
    ) -> Result<LoadOutcome, KitError> {
        let mut engine = self.engine.lock();
        let mut loaded = self.uri_loaded.lock();

        if !*loaded {
            engine.document_load(uri, password)?;
            if let Some(outcome) = engine.password_outcome() {
                return Ok(match outcome {
                    PasswordOutcome::RequiredToView => LoadOutcome::PasswordRequiredToView,
                    PasswordOutcome::RequiredToModify => LoadOutcome::PasswordRequiredToModify,
                    PasswordOutcome::Wrong => LoadOutcome::WrongPassword,
                });
            }
            *loaded = true;
        } else if let Some(outcome) = engine.password_outcome() {
            // A second attach while the document is password-gated: the
            // original attempt must have failed, so surface it again.
            return Ok(match outcome {
                PasswordOutcome::RequiredToView => LoadOutcome::PasswordRequiredToView,
                PasswordOutcome::RequiredToModify => LoadOutcome::PasswordRequiredToModify,
                PasswordOutcome::Wrong => LoadOutcome::WrongPassword,
            });
        }

        let view_id = engine.create_view()?;
        drop(loaded);
        drop(engine);

        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.view_id = view_id;
        }
        Ok(LoadOutcome::Loaded { view_id })
    }

    /// Destroys the engine view for `session_id`, tombstones its
    /// `(user_id, user_name)`, and returns the current view ids so the
    /// caller can broadcast fresh `viewinfo`.
    pub fn on_unload(&self, session_id: &str) -> Vec<i32> {
        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get_mut(session_id) else {
            warn!(doc = %self.doc_id, session = session_id, "on_unload: session not found");
            return Vec::new();
        };
        session.mark_closing();
        let view_id = session.view_id;
        let (user_id, user_name) = (session.user_id.clone(), session.user_name.clone());
        drop(sessions);

        if view_id >= 0 {
            self.engine.lock().destroy_view(view_id);
            self.view_tombstones.lock().insert(view_id, (user_id, user_name));
        }

        self.remaining_view_ids()
    }

    fn remaining_view_ids(&self) -> Vec<i32> {
        self.sessions.lock().values().filter(|s| s.view_id >= 0 && !s.is_closing()).map(|s| s.view_id).collect()
    }

    /// Removes closed sessions and reports how many remain. Callers
    /// should shut the document down when this reaches zero (§4.6).
    pub fn purge_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock();
        sessions.retain(|_, s| !s.is_closing());
        sessions.len()
    }

    /// Builds the `viewinfo:` payload for the given view ids, resolving
    /// each author's color via the engine's `.uno:TrackedChangeAuthors`
    /// command-values call (§4.6).
    pub fn notify_view_info(&self, view_ids: &[i32]) -> String {
        let sessions = self.sessions.lock();
        let tombstones = self.view_tombstones.lock();
        let mut engine = self.engine.lock();
        let colors = engine.get_command_values(".uno:TrackedChangeAuthors").unwrap_or_default();
        let colors: HashMap<String, String> =
            serde_json::from_str(&colors).unwrap_or_default();

        let entries: Vec<ViewInfoEntry> = view_ids
            .iter()
            .map(|&id| {
                let (user_id, user_name) = sessions
                    .values()
                    .find(|s| s.view_id == id)
                    .map(|s| (s.user_id.clone(), s.user_name.clone()))
                    .or_else(|| tombstones.get(&id).cloned())
                    .unwrap_or_default();
                let color = colors.get(&user_id).cloned().unwrap_or_default();
                ViewInfoEntry { id, userid: user_id, username: user_name, color }
            })
            .collect();

        encode_view_info_frame(&entries)
    }

    pub fn with_sessions<R>(&self, f: impl FnOnce(&mut HashMap<String, ChildSession>) -> R) -> R {
        f(&mut self.sessions.lock())
    }

    pub fn with_engine<R>(&self, f: impl FnOnce(&mut dyn DocumentEngine) -> R) -> R {
        f(self.engine.lock().as_mut())
    }

    /// Route one callback to its target session(s), applying
    /// active/inactive handling per session (§4.3, §4.4). `view_id ==
    /// -1` broadcasts to every session; otherwise it's routed to the
    /// session owning that view.
    pub fn route_callback(&self, cb: &crate::callback::CallbackRecord) -> Vec<(String, OutboundFrame)> {
        let mut sessions = self.sessions.lock();
        let mut out = Vec::new();
        for session in sessions.values_mut() {
            if session.is_closing() {
                continue;
            }
            if cb.is_broadcast() || session.view_id == cb.view_id {
                if let Some(frame) = session.handle_callback(cb) {
                    out.push((session.session_id.clone(), frame));
                }
            }
        }
        out
    }

    /// Reactivate a session (`useractive`), returning the replay frames
    /// it must now be sent.
    pub fn activate_session(&self, session_id: &str) -> Vec<OutboundFrame> {
        let mut sessions = self.sessions.lock();
        sessions.get_mut(session_id).map(ChildSession::activate).unwrap_or_default()
    }

    pub fn deactivate_session(&self, session_id: &str) {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.deactivate();
        }
    }

    pub fn shutdown(&self) {
        self.queue.put(Message::Eof);
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
