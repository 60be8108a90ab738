// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// Process-level configuration for one document's message and tile
/// scheduling core.
#[derive(Debug, Parser)]
#[command(name = "dockit", version, about)]
pub struct KitConfig {
    /// Document identifier this process is responsible for.
    #[arg(long, env = "DOCKIT_DOC_ID")]
    pub doc_id: String,

    /// Rendered-tile cache budget in bytes before eviction runs.
    #[arg(long, env = "DOCKIT_CACHE_BUDGET_BYTES", default_value = "134217728")]
    pub cache_budget_bytes: u64,

    /// Maximum width, in document units, an invalidation merge may reach.
    #[arg(long, env = "DOCKIT_MERGE_MAX_WIDTH", default_value = "15360")]
    pub merge_max_width: i64,

    /// Maximum height, in document units, an invalidation merge may reach.
    #[arg(long, env = "DOCKIT_MERGE_MAX_HEIGHT", default_value = "7680")]
    pub merge_max_height: i64,

    /// Maximum number of messages the queue will hold before rejecting
    /// new ingress with a `Resource` error.
    #[arg(long, env = "DOCKIT_MAX_QUEUE_LEN", default_value = "10000")]
    pub max_queue_len: usize,

    /// Log format (json or text).
    #[arg(long, env = "DOCKIT_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "DOCKIT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl KitConfig {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.doc_id.trim().is_empty() {
            anyhow::bail!("--doc-id must not be empty");
        }
        if self.cache_budget_bytes == 0 {
            anyhow::bail!("--cache-budget-bytes must be positive");
        }
        if self.merge_max_width <= 0 || self.merge_max_height <= 0 {
            anyhow::bail!("--merge-max-width and --merge-max-height must be positive");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn merge_budget(&self) -> crate::tile_queue::MergeBudget {
        crate::tile_queue::MergeBudget { max_width: self.merge_max_width, max_height: self.merge_max_height }
    }
}

/// Initialize tracing from config. Uses `try_init` so it's safe to call more
/// than once (e.g. from tests).
pub fn init_tracing(config: &KitConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if std::env::var("DOCKIT_LOG_LEVEL").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
