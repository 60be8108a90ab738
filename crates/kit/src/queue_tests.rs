// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::message::{ControlKind, Message};

#[test]
fn pop_blocking_waits_for_put() -> anyhow::Result<()> {
    let queue: Arc<MessageQueue<()>> = Arc::new(MessageQueue::new(()));
    let q2 = Arc::clone(&queue);
    let handle = std::thread::spawn(move || q2.pop_blocking());

    std::thread::sleep(Duration::from_millis(20));
    queue.with_locked(|inner| {
        inner.items.push_back(Message::Control { kind: ControlKind::Other, view_id: 1, payload: "x".into() })
    });

    let msg = handle.join().map_err(|_| anyhow::anyhow!("pop_blocking thread panicked"))?;
    assert!(matches!(msg, Message::Control { .. }));
    Ok(())
}

#[test]
fn pop_timeout_returns_none_when_empty() {
    let queue: MessageQueue<()> = MessageQueue::new(());
    assert!(queue.pop_timeout(Duration::from_millis(10)).is_none());
}

#[test]
fn fifo_order_preserved() -> anyhow::Result<()> {
    let queue: MessageQueue<()> = MessageQueue::new(());
    for i in 0..3 {
        queue.with_locked(|inner| {
            inner.items.push_back(Message::ChildCommand { session_id: i.to_string(), command: String::new() })
        });
    }
    for i in 0..3 {
        let Message::ChildCommand { session_id, .. } = queue.pop_blocking() else {
            anyhow::bail!("expected ChildCommand");
        };
        assert_eq!(session_id, i.to_string());
    }
    Ok(())
}
