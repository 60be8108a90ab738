// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::callback::CallbackKind;
use crate::test_support::FakeEngine;

fn doc() -> Document {
    Document::new("doc-1", Box::new(FakeEngine::default()))
}

#[test]
fn create_session_is_idempotent() {
    let d = doc();
    assert!(d.create_session(ChildSession::new("s1", "u1", "Alice")));
    assert!(d.create_session(ChildSession::new("s1", "u1", "Alice")));
    d.with_sessions(|sessions| assert_eq!(sessions.len(), 1));
}

#[test]
fn on_load_allocates_a_view_and_is_serialized_one_at_a_time() -> anyhow::Result<()> {
    let d = doc();
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    d.create_session(ChildSession::new("s2", "u2", "Bob"));

    let first = d.on_load("s1", "file:///doc.odt", None)?;
    assert_eq!(first, LoadOutcome::Loaded { view_id: 0 });

    // Second caller creates a new view into the already-open document.
    let second = d.on_load("s2", "file:///doc.odt", None)?;
    assert_eq!(second, LoadOutcome::Loaded { view_id: 1 });
    Ok(())
}

#[test]
fn wrong_password_is_reported_without_opening_the_document() -> anyhow::Result<()> {
    let d = Document::new(
        "doc-1",
        Box::new({
            let mut e = FakeEngine::default();
            e.required_password = Some("secret".into());
            e
        }),
    );
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    let outcome = d.on_load("s1", "file:///doc.odt", Some("wrong"))?;
    assert_eq!(outcome, LoadOutcome::PasswordRequiredToView);
    Ok(())
}

#[test]
fn on_unload_tombstones_the_view_and_reports_remaining_sessions() -> anyhow::Result<()> {
    let d = doc();
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    d.create_session(ChildSession::new("s2", "u2", "Bob"));
    d.on_load("s1", "file:///doc.odt", None)?;
    d.on_load("s2", "file:///doc.odt", None)?;

    let remaining = d.on_unload("s1");
    assert_eq!(remaining, vec![1]);

    let count = d.purge_sessions();
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn route_callback_broadcasts_to_every_active_session() -> anyhow::Result<()> {
    let d = doc();
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    d.create_session(ChildSession::new("s2", "u2", "Bob"));
    d.on_load("s1", "file:///doc.odt", None)?;
    d.on_load("s2", "file:///doc.odt", None)?;

    let cb = crate::callback::CallbackRecord::new(
        crate::callback::CallbackRecord::BROADCAST,
        CallbackKind::DocumentSizeChanged,
        "1000, 2000",
    );
    let frames = d.route_callback(&cb);
    assert_eq!(frames.len(), 2);
    Ok(())
}

#[test]
fn route_callback_targets_only_the_owning_session() -> anyhow::Result<()> {
    let d = doc();
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    d.create_session(ChildSession::new("s2", "u2", "Bob"));
    d.on_load("s1", "file:///doc.odt", None)?; // view 0
    d.on_load("s2", "file:///doc.odt", None)?; // view 1

    let cb = crate::callback::CallbackRecord::new(0, CallbackKind::StateChanged, ".uno:Bold=true");
    let frames = d.route_callback(&cb);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, "s1");
    Ok(())
}

#[test]
fn notify_view_info_includes_tombstoned_users() -> anyhow::Result<()> {
    let d = doc();
    d.create_session(ChildSession::new("s1", "u1", "Alice"));
    d.on_load("s1", "file:///doc.odt", None)?;
    d.on_unload("s1");

    let frame = d.notify_view_info(&[0]);
    assert!(frame.contains("Alice"));
    Ok(())
}
