//! Per-(command, user) cooldown bookkeeping.

use dashmap::DashMap;
use poise::serenity_prelude::UserId;
use std::time::Duration;
use tokio::time::Instant;

/// Last successful use of each command by each user.
///
/// Entries are evicted lazily: a lookup that finds an expired timestamp
/// removes it.
#[derive(Debug, Default)]
pub struct CooldownCache {
    entries: DashMap<(String, UserId), Instant>,
}

impl CooldownCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `user` may run `command` again, or zero if they may run it now.
    pub fn remaining(&self, command: &str, user: UserId, window: Duration) -> Duration {
        if window.is_zero() {
            return Duration::ZERO;
        }

        let key = (command.to_string(), user);
        let now = Instant::now();
        let remaining = self
            .entries
            .get(&key)
            .map_or(Duration::ZERO, |last| (*last + window).saturating_duration_since(now));

        if remaining.is_zero() {
            self.entries
                .remove_if(&key, |_, last| *last + window <= now);
        }
        remaining
    }

    /// Records a use of `command` by `user` at the current time.
    pub fn record(&self, command: &str, user: UserId) {
        self.entries.insert((command.to_string(), user), Instant::now());
    }

    /// Number of tracked entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
