use std::time::Duration;

use super::ledger::LockPolicy;

/// Tunables for the ledger engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bounded wait applied to every account lock acquisition
    pub lock_policy: LockPolicy,
    /// How many times a `Conflict` is retried before it reaches the caller
    pub max_conflict_retries: u32,
    /// Pause before the first retry; grows linearly with each attempt
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_policy: LockPolicy::default(),
            max_conflict_retries: 3,
            retry_backoff: Duration::from_millis(1),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_lock_timeout(mut self, max_wait: Duration) -> Self {
        self.lock_policy.max_wait = max_wait;
        self
    }

    #[must_use]
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }
}
