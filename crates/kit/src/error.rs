// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

//! The error taxonomy dispatched messages and sessions fail into: which
//! errors are logged and swallowed at the dispatcher boundary, which are
//! turned into an outbound `error:` frame for the originating session, and
//! which propagate out of `Document::run` to end the process.

use std::fmt;

/// Unified error category, deciding how [`crate::dispatcher::RenderDispatcher`]
/// handles a failure surfaced from the queue, the engine, or a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input at the queue boundary (client sent something the
    /// core cannot parse into a [`crate::message::Message`]).
    Protocol,
    /// The originating session lacks permission for the requested
    /// operation (e.g. an edit from a read-only view).
    Authorization,
    /// The document engine rejected or failed a call (paint, load, save).
    Engine,
    /// A resource limit was hit (queue too long, cache over budget after
    /// eviction, too many sessions).
    Resource,
    /// Unrecoverable: the document itself cannot continue.
    Fatal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protocol => "PROTOCOL",
            Self::Authorization => "AUTHORIZATION",
            Self::Engine => "ENGINE",
            Self::Resource => "RESOURCE",
            Self::Fatal => "FATAL",
        }
    }

    /// Whether this kind, once logged, lets the dispatch loop continue
    /// rather than propagating out of `Document::run`.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error surfaced while processing one message, naming the command
/// that failed so Authorization errors can be turned into an `error:
/// cmd=... kind=...` frame addressed back to the originating session.
#[derive(Debug)]
pub struct KitError {
    pub kind: ErrorKind,
    pub cmd: String,
    pub message: String,
}

impl fmt::Display for KitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: cmd={} ({})", self.kind, self.cmd, self.message)
    }
}

impl std::error::Error for KitError {}

impl KitError {
    pub fn new(kind: ErrorKind, cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, cmd: cmd.into(), message: message.into() }
    }

    pub fn protocol(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, cmd, message)
    }

    pub fn authorization(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, cmd, message)
    }

    pub fn engine(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Engine, cmd, message)
    }

    pub fn resource(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resource, cmd, message)
    }

    pub fn fatal(cmd: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, cmd, message)
    }

    /// The outbound frame sent back to the originating session for an
    /// `Authorization` failure (§6.1's `error:` frame shape).
    pub fn to_frame(&self) -> String {
        format!("error: cmd={} kind={} msg={}", self.cmd, self.kind, self.message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
