use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ClientKey;

/// Attempt timestamps per client key, in milliseconds since the Unix epoch.
///
/// Serializes as a JSON object of integer arrays, one array per key. Within a
/// key timestamps never decrease in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptLog {
    entries: BTreeMap<ClientKey, Vec<i64>>,
}

/// What a full expiry sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Timestamps that fell out of the window.
    pub expired_attempts: usize,
    /// Keys dropped because no live timestamps remained.
    pub dropped_keys: usize,
}

impl PurgeSummary {
    /// Returns true when the sweep changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.expired_attempts == 0 && self.dropped_keys == 0
    }
}

impl AttemptLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys tracked, including keys with empty sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no key is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the recorded timestamps for `key`, oldest first.
    #[must_use]
    pub fn attempts(&self, key: &ClientKey) -> &[i64] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Removes timestamps of `key` with `now - t >= window_ms` and returns the
    /// number of live timestamps left. The key is created if absent.
    pub fn prune(&mut self, key: &ClientKey, now_ms: i64, window_ms: i64) -> usize {
        let attempts = self.entries.entry(key.clone()).or_default();
        attempts.retain(|&timestamp| is_live(timestamp, now_ms, window_ms));
        attempts.len()
    }

    /// Appends an attempt for `key`.
    ///
    /// A timestamp older than the newest recorded one is clamped up to it so
    /// the sequence stays ordered when the wall clock steps backwards.
    pub fn record(&mut self, key: &ClientKey, now_ms: i64) {
        let attempts = self.entries.entry(key.clone()).or_default();
        let timestamp = attempts
            .last()
            .map_or(now_ms, |&newest| newest.max(now_ms));
        attempts.push(timestamp);
    }

    /// Oldest timestamp still recorded for `key`.
    #[must_use]
    pub fn oldest(&self, key: &ClientKey) -> Option<i64> {
        self.attempts(key).first().copied()
    }

    /// Drops expired timestamps across every key and removes emptied keys.
    pub fn purge_expired(&mut self, now_ms: i64, window_ms: i64) -> PurgeSummary {
        let mut summary = PurgeSummary::default();

        self.entries.retain(|_, attempts| {
            let before = attempts.len();
            attempts.retain(|&timestamp| is_live(timestamp, now_ms, window_ms));
            summary.expired_attempts += before - attempts.len();

            let keep = !attempts.is_empty();
            if !keep {
                summary.dropped_keys += 1;
            }
            keep
        });

        summary
    }

    /// Restores the ordering invariant on data read from outside the process.
    pub fn normalize(&mut self) {
        for attempts in self.entries.values_mut() {
            attempts.sort_unstable();
        }
    }
}

fn is_live(timestamp: i64, now_ms: i64, window_ms: i64) -> bool {
    now_ms.saturating_sub(timestamp) < window_ms
}
