// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use super::*;

#[test]
fn fatal_errors_are_not_recoverable() {
    assert!(!ErrorKind::Fatal.is_recoverable());
    assert!(ErrorKind::Protocol.is_recoverable());
    assert!(ErrorKind::Authorization.is_recoverable());
    assert!(ErrorKind::Engine.is_recoverable());
    assert!(ErrorKind::Resource.is_recoverable());
}

#[test]
fn authorization_error_renders_as_outbound_frame() {
    let err = KitError::authorization("key", "read-only view");
    assert_eq!(err.to_frame(), "error: cmd=key kind=AUTHORIZATION msg=read-only view");
}
