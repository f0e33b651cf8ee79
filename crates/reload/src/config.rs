// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use crate::source::{check_base_url, HttpOptions, DEFAULT_NONCE_PATH};
use crate::watcher::DEFAULT_MAX_IN_FLIGHT;

/// Poll a server's nonce endpoint and reload when it changes.
#[derive(Debug, Clone, Parser)]
#[command(name = "reloadwatch", version, about)]
pub struct WatchConfig {
    /// Base URL of the server to watch (e.g. http://127.0.0.1:8080).
    #[arg(long, env = "RELOADWATCH_URL")]
    pub url: String,

    /// Path of the nonce endpoint.
    #[arg(long, default_value = DEFAULT_NONCE_PATH, env = "RELOADWATCH_PATH")]
    pub path: String,

    /// Poll interval in milliseconds.
    #[arg(long, default_value_t = 1000, env = "RELOADWATCH_INTERVAL_MS")]
    pub interval_ms: u64,

    /// Per-request timeout in milliseconds. Unbounded if unset; a server
    /// that never answers then holds up to --max-in-flight requests open.
    #[arg(long, env = "RELOADWATCH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum outstanding requests; ticks beyond this are skipped.
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT, env = "RELOADWATCH_MAX_IN_FLIGHT")]
    pub max_in_flight: usize,

    /// Basic auth username.
    #[arg(long, env = "RELOADWATCH_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "RELOADWATCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Shell command (`sh -c`) to run on every nonce change.
    #[arg(long, env = "RELOADWATCH_ON_CHANGE")]
    pub on_change: Option<String>,

    /// Exit with status 3 on the first nonce change, for supervisor restarts.
    #[arg(long, env = "RELOADWATCH_EXIT_ON_CHANGE")]
    pub exit_on_change: bool,

    /// Log format (json or text).
    #[arg(long, env = "RELOADWATCH_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "RELOADWATCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl WatchConfig {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_base_url(&self.url).map_err(|e| anyhow::anyhow!("--url: {e}"))?;
        if !self.path.starts_with('/') {
            anyhow::bail!("--path must start with '/': {}", self.path);
        }
        if self.interval_ms == 0 {
            anyhow::bail!("--interval-ms must be greater than zero");
        }
        if self.timeout_ms == Some(0) {
            anyhow::bail!("--timeout-ms must be greater than zero");
        }
        if self.max_in_flight == 0 {
            anyhow::bail!("--max-in-flight must be greater than zero");
        }
        if self.password.is_some() && self.username.is_none() {
            anyhow::bail!("--password requires --username");
        }
        if self.on_change.is_some() && self.exit_on_change {
            anyhow::bail!("cannot specify both --on-change and --exit-on-change");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: self.timeout(),
            basic_auth: self.username.clone().map(|u| (u, self.password.clone())),
        }
    }

    /// Build a minimal `WatchConfig` for tests.
    #[doc(hidden)]
    pub fn test(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: DEFAULT_NONCE_PATH.into(),
            interval_ms: 50,
            timeout_ms: Some(1000),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            username: None,
            password: None,
            on_change: None,
            exit_on_change: false,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
