use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use arca_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::Object;
use crate::traits::ObjectStore;

/// Bounded exponential backoff with jitter for transient store failures.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per attempt after that.
    pub base_delay_ms: u64,
    /// Ceiling on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt` (1-based; attempt 1 has no delay).
    /// Jittered uniformly over [half, full] to avoid thundering herds.
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(16);
        let full = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        let jittered = rand::thread_rng().gen_range(full / 2..=full.max(1));
        Duration::from_millis(jittered)
    }
}

/// Store wrapper retrying transient failures a bounded number of times.
///
/// Only errors reporting [`StoreError::is_transient`] are retried; structural
/// and partial-write failures escalate immediately. Exhausting the policy
/// returns the last error, which fails the surrounding load session.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ObjectStore> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn with_retries<T>(
        &self,
        op: &'static str,
        mut call: impl FnMut() -> StoreResult<T>,
    ) -> StoreResult<T> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last: Option<StoreError> = None;
        for attempt in 1..=attempts {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(op, attempt, error = %e, "transient store error, retrying");
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        // Unreachable unless attempts == 0 was clamped; keep the last error.
        Err(last.unwrap_or(StoreError::Transient {
            op,
            reason: "retry budget exhausted".to_string(),
        }))
    }
}

impl<S: ObjectStore> ObjectStore for RetryingStore<S> {
    fn missing(&self, kind: ObjectKind, ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        self.with_retries("missing", || self.inner.missing(kind, ids))
    }

    fn add(&self, kind: ObjectKind, objects: &[Object]) -> StoreResult<usize> {
        self.with_retries("add", || self.inner.add(kind, objects))
    }
}
