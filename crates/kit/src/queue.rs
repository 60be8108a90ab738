// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe FIFO with room for auxiliary locked state, the base
//! [`TileQueue`](crate::tile_queue::TileQueue) builds on.
//!
//! A single `parking_lot::Mutex` guards both the message deque and
//! whatever auxiliary state the specialization needs (for `TileQueue`,
//! the cursor table and view-order list) so that, per spec.md §5, "the
//! queue mutex guards the underlying vector, the cursor table, and the
//! view-order list" as one atomic unit. A `Condvar` makes `pop` block
//! until `put` signals, the only suspension point in the dispatcher.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::message::Message;

/// Locked state: the message deque plus whatever auxiliary data (cursor
/// table, etc.) the specialization needs, guarded by the same mutex.
pub struct QueueInner<Aux> {
    pub items: VecDeque<Message>,
    pub aux: Aux,
}

/// Generic locked FIFO. `Aux` carries state that must be updated
/// atomically with the queue (e.g. cursor positions).
pub struct MessageQueue<Aux> {
    state: Mutex<QueueInner<Aux>>,
    cond: Condvar,
}

impl<Aux> MessageQueue<Aux> {
    pub fn new(aux: Aux) -> Self {
        Self { state: Mutex::new(QueueInner { items: VecDeque::new(), aux }), cond: Condvar::new() }
    }

    /// Run `f` with exclusive access to the locked state, then wake any
    /// thread blocked in `pop_blocking`.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut QueueInner<Aux>) -> R) -> R {
        let mut guard = self.state.lock();
        let result = f(&mut guard);
        drop(guard);
        self.cond.notify_all();
        result
    }

    /// Read-only access, no notification.
    pub fn peek_locked<R>(&self, f: impl FnOnce(&QueueInner<Aux>) -> R) -> R {
        let guard = self.state.lock();
        f(&guard)
    }

    /// Pop the front message, blocking until one is available.
    pub fn pop_blocking(&self) -> Message {
        let mut guard = self.state.lock();
        loop {
            if let Some(msg) = guard.items.pop_front() {
                return msg;
            }
            self.cond.wait(&mut guard);
        }
    }

    /// Pop the front message if present within `timeout`, without
    /// blocking indefinitely. Used by tests and by graceful-shutdown
    /// polling; the dispatcher itself uses [`Self::pop_blocking`].
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Message> {
        let mut guard = self.state.lock();
        if let Some(msg) = guard.items.pop_front() {
            return Some(msg);
        }
        let result = self.cond.wait_for(&mut guard, timeout);
        if result.timed_out() {
            None
        } else {
            guard.items.pop_front()
        }
    }

    /// Block until `try_take` extracts something from the locked state,
    /// re-waiting on the condvar between attempts. Used for priority-based
    /// dequeue, where "is there work" and "which work" are one decision.
    pub fn wait_until<R>(&self, mut try_take: impl FnMut(&mut QueueInner<Aux>) -> Option<R>) -> R {
        let mut guard = self.state.lock();
        loop {
            if let Some(result) = try_take(&mut guard) {
                return result;
            }
            self.cond.wait(&mut guard);
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
