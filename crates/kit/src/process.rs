// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process state that would otherwise be a global: the shutdown flag
//! and the document-id counter, bundled so tests can run multiple
//! independent [`crate::document::Document`]s without sharing statics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ProcessContext {
    termination_flag: Arc<AtomicBool>,
    next_doc_id: Arc<AtomicU64>,
}

impl Default for ProcessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessContext {
    pub fn new() -> Self {
        Self { termination_flag: Arc::new(AtomicBool::new(false)), next_doc_id: Arc::new(AtomicU64::new(1)) }
    }

    pub fn request_termination(&self) {
        self.termination_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_terminating(&self) -> bool {
        self.termination_flag.load(Ordering::SeqCst)
    }

    pub fn next_doc_id(&self) -> u64 {
        self.next_doc_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
