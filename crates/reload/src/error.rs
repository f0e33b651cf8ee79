// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Why a tick produced no reading.
///
/// Every variant is handled the same way by the watcher: the tick is
/// skipped and the stored nonce is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The endpoint answered with something other than 200.
    Status(u16),
    /// The request never produced a response (refused, DNS, timeout).
    Transport(String),
    /// The response body could not be read as text.
    Body(String),
}

impl FetchError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status(_) => "STATUS",
            Self::Transport(_) => "TRANSPORT",
            Self::Body(_) => "BODY",
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{}: http status {code}", self.as_str()),
            Self::Transport(msg) | Self::Body(msg) => write!(f, "{}: {msg}", self.as_str()),
        }
    }
}

impl std::error::Error for FetchError {}
