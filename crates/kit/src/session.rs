// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client session state machine inside the kit (§3 Session, §4.4
//! ChildSession): routes dequeued non-tile messages to the engine and
//! decides, per incoming callback, whether to forward it live or record
//! it for replay while the client is inactive.

use tracing::{debug, trace};

use crate::callback::CallbackRecord;
use crate::recorder::StateRecorder;
use crate::wire::encode_callback_frame;

/// An outbound frame a session hands to its transport. The core never
/// writes to a socket directly (transport is out of scope, §1); callers
/// collect these and hand them to whatever owns the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame(pub String);

/// Per-client session state (§3). Created before `view_id` is known
/// (`-1` until the engine allocates a view) and destroyed on disconnect.
pub struct ChildSession {
    pub session_id: String,
    pub view_id: i32,
    is_active: bool,
    is_closing: bool,
    recorder: StateRecorder,
    pub watermark: Option<String>,
    pub doc_password: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub locale: String,
}

impl ChildSession {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            view_id: -1,
            is_active: true,
            is_closing: false,
            recorder: StateRecorder::new(),
            watermark: None,
            doc_password: None,
            user_id: user_id.into(),
            user_name: user_name.into(),
            locale: "en-US".to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_closing(&self) -> bool {
        self.is_closing
    }

    pub fn mark_closing(&mut self) {
        self.is_closing = true;
    }

    /// `userinactive`: suppress outbound frames and begin recording.
    pub fn deactivate(&mut self) {
        trace!(session = %self.session_id, "session deactivated");
        self.is_active = false;
    }

    /// `useractive`: replay the recorder's accumulated events in order,
    /// then resume live forwarding.
    pub fn activate(&mut self) -> Vec<OutboundFrame> {
        let replay = self.recorder.drain_replay(self.view_id);
        debug!(session = %self.session_id, replayed = replay.len(), "session reactivated");
        self.is_active = true;
        replay.iter().map(|cb| OutboundFrame(encode_callback_frame(cb))).collect()
    }

    /// Handle one callback routed to this session (§4.4). Returns the
    /// outbound frame to forward live, or `None` if it was recorded
    /// instead (or, for callbacks this session doesn't own and isn't a
    /// broadcast target of, dropped entirely by the caller before this
    /// is even called).
    pub fn handle_callback(&mut self, cb: &CallbackRecord) -> Option<OutboundFrame> {
        if self.is_active || cb.is_always_forwarded() {
            Some(OutboundFrame(encode_callback_frame(cb)))
        } else {
            self.recorder.record(cb);
            None
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
