// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version tokens and the last-seen comparison rule.

use std::fmt;

/// Opaque build/version identifier served by the nonce endpoint.
///
/// Only equality is meaningful. The empty token doubles as the
/// "not yet observed" sentinel, so an empty reading never establishes a
/// baseline that a later reading can differ from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Nonce {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Nonce {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A detected transition between two non-sentinel tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceChange {
    pub previous: Nonce,
    pub current: Nonce,
}

/// Result of feeding one successful reading into a [`NonceTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Nothing was stored yet; the reading became the baseline.
    Baseline,
    /// The reading matched the stored token.
    Unchanged,
    /// The stored token was non-empty and the reading differs.
    Changed(NonceChange),
}

impl Observation {
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// Holds the last successfully observed token for one watcher.
#[derive(Debug, Default)]
pub struct NonceTracker {
    last_seen: Nonce,
}

impl NonceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored token, or `None` while still at the sentinel.
    pub fn last_seen(&self) -> Option<&Nonce> {
        if self.last_seen.is_empty() {
            None
        } else {
            Some(&self.last_seen)
        }
    }

    /// Compare `current` against the stored token, then store it.
    ///
    /// The store happens unconditionally, so a given change is reported
    /// exactly once.
    pub fn observe(&mut self, current: Nonce) -> Observation {
        let observation = if self.last_seen.is_empty() {
            Observation::Baseline
        } else if self.last_seen == current {
            Observation::Unchanged
        } else {
            Observation::Changed(NonceChange {
                previous: self.last_seen.clone(),
                current: current.clone(),
            })
        };
        self.last_seen = current;
        observation
    }
}

#[cfg(test)]
#[path = "nonce_tests.rs"]
mod tests;
