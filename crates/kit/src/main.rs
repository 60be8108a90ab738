// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process entry point for one document's kit worker.
//!
//! Transport and the document engine itself are external collaborators
//! (see `dockit::engine::DocumentEngine`); this binary only validates
//! configuration, initializes logging, and hands control to whatever
//! process embeds the core with a real engine and socket. It exists so
//! the crate is runnable standalone for smoke-testing the config/logging
//! path.

use clap::Parser;
use tracing::info;

use dockit::config::{init_tracing, KitConfig};
use dockit::process::ProcessContext;

fn main() {
    let config = KitConfig::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);
    let process = ProcessContext::new();

    info!(
        doc_id = %config.doc_id,
        cache_budget_bytes = config.cache_budget_bytes,
        max_queue_len = config.max_queue_len,
        terminating = process.is_terminating(),
        "kit worker ready, awaiting engine and transport wiring"
    );

    // The embedding process is responsible for constructing a
    // `DocumentEngine`, wiring a transport to `RenderDispatcher`'s
    // `RoutedFrame`s, and calling `ProcessContext::request_termination`
    // on shutdown; neither is this binary's concern (§1 out of scope).
}
