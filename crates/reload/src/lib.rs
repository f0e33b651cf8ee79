// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reloadwatch: poll a server's nonce endpoint and reload when it changes.

pub mod config;
pub mod error;
pub mod nonce;
pub mod reloader;
pub mod source;
pub mod watcher;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::WatchConfig;
use crate::reloader::{CommandReloader, ExitReloader, LogReloader, Reloader};
use crate::source::HttpNonceSource;
use crate::watcher::{ReloadWatcher, WatchSummary};

/// Process exit status used when `--exit-on-change` fires.
pub const EXIT_ON_CHANGE_STATUS: i32 = 3;

/// Pick the reload action for a config.
pub fn build_reloader(config: &WatchConfig) -> Box<dyn Reloader> {
    if config.exit_on_change {
        Box::new(ExitReloader)
    } else if let Some(ref command) = config.on_change {
        Box::new(CommandReloader::new(command.clone()))
    } else {
        Box::new(LogReloader)
    }
}

/// Build the watcher described by `config`.
pub fn build_watcher(config: &WatchConfig) -> anyhow::Result<ReloadWatcher> {
    let source = HttpNonceSource::new(&config.url, &config.path, config.http_options())?;
    tracing::info!(url = source.url(), interval_ms = config.interval_ms, "watching nonce");
    Ok(ReloadWatcher::new(Arc::new(source), build_reloader(config))
        .with_interval(config.interval())
        .with_max_in_flight(config.max_in_flight))
}

/// Run the watcher until `shutdown` fires or the reload action stops it.
pub async fn run(config: WatchConfig, shutdown: CancellationToken) -> anyhow::Result<WatchSummary> {
    let watcher = build_watcher(&config)?;
    let summary = watcher.run(shutdown).await;
    tracing::info!(
        readings = summary.readings,
        skipped = summary.skipped,
        reloads = summary.reloads,
        stop = ?summary.stop,
        "watcher stopped"
    );
    Ok(summary)
}
