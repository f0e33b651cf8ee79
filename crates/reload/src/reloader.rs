// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reload actions fired when the watched nonce changes.

use std::process::Stdio;

use crate::nonce::NonceChange;

/// What the watcher does after a reload action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterReload {
    /// Keep polling with the new nonce as baseline.
    Continue,
    /// Stop the watcher; the reload replaced the watched context.
    Stop,
}

/// Side effect performed on a detected change.
pub trait Reloader: Send + Sync {
    fn reload(&self, change: &NonceChange) -> AfterReload;
}

/// Wraps a closure, mostly for tests and embedding.
pub struct CallbackReloader<F> {
    callback: F,
}

impl<F> CallbackReloader<F>
where
    F: Fn(&NonceChange) -> AfterReload + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Reloader for CallbackReloader<F>
where
    F: Fn(&NonceChange) -> AfterReload + Send + Sync,
{
    fn reload(&self, change: &NonceChange) -> AfterReload {
        (self.callback)(change)
    }
}

/// Logs the change and keeps watching.
pub struct LogReloader;

impl Reloader for LogReloader {
    fn reload(&self, change: &NonceChange) -> AfterReload {
        tracing::info!(previous = %change.previous, current = %change.current, "nonce changed");
        AfterReload::Continue
    }
}

/// Stops the watcher so the process can exit and be restarted by its
/// supervisor.
pub struct ExitReloader;

impl Reloader for ExitReloader {
    fn reload(&self, change: &NonceChange) -> AfterReload {
        tracing::info!(
            previous = %change.previous,
            current = %change.current,
            "nonce changed, exiting for restart"
        );
        AfterReload::Stop
    }
}

/// Environment variable carrying the previous nonce to a reload command.
pub const ENV_PREVIOUS_NONCE: &str = "RELOAD_PREVIOUS_NONCE";
/// Environment variable carrying the new nonce to a reload command.
pub const ENV_CURRENT_NONCE: &str = "RELOAD_CURRENT_NONCE";

/// Runs a shell command (`sh -c`) on every change.
///
/// The command is spawned detached from the watch loop; its exit status is
/// logged from a background task, so `reload` must run inside a tokio
/// runtime.
pub struct CommandReloader {
    command: String,
}

impl CommandReloader {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn build(&self, change: &NonceChange) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.args(["-c", &self.command]);
        cmd.env(ENV_PREVIOUS_NONCE, change.previous.as_str());
        cmd.env(ENV_CURRENT_NONCE, change.current.as_str());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        cmd
    }
}

impl Reloader for CommandReloader {
    fn reload(&self, change: &NonceChange) -> AfterReload {
        tracing::info!(
            previous = %change.previous,
            current = %change.current,
            command = %self.command,
            "nonce changed, running reload command"
        );

        match self.build(change).spawn() {
            Ok(mut child) => {
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if status.success() => {}
                        Ok(status) => tracing::warn!(%status, "reload command failed"),
                        Err(e) => tracing::error!(err = %e, "failed to wait on reload command"),
                    }
                });
            }
            Err(e) => {
                tracing::error!(err = %e, "failed to spawn reload command");
            }
        }
        AfterReload::Continue
    }
}

#[cfg(test)]
#[path = "reloader_tests.rs"]
mod tests;
