// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential backoff between failed unlock attempts.
//!
//! The failure count and the time of the last failure live in the station
//! store under `gh_unlock_failures`, so a fresh process still owes the delay
//! earned by the previous one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pulse_config::model::VaultConfig;
use pulse_core::{KeyValueStore, PulseError, StoreKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Largest doubling exponent applied to the base delay.
const MAX_SHIFT: u32 = 20;

/// Persisted record of consecutive unlock failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub failures: u32,
    pub last_failure: Option<DateTime<Utc>>,
}

/// Computes and enforces the delay owed before the next unlock attempt.
///
/// The delay after `n` failures is `base * 2^(n-1)`, capped at `max`, and
/// counts down from the moment of the last failure.
#[derive(Debug, Clone)]
pub struct UnlockThrottle {
    base: Duration,
    max: Duration,
}

impl UnlockThrottle {
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            base: Duration::from_millis(config.unlock_backoff_ms),
            max: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Full delay earned by `failures` consecutive failures.
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let shift = (failures - 1).min(MAX_SHIFT);
        self.base.saturating_mul(1u32 << shift).min(self.max)
    }

    /// Part of the delay still owed at `now`.
    ///
    /// A last failure in the future (clock stepped back) owes the full delay.
    pub fn remaining(&self, record: &FailureRecord, now: DateTime<Utc>) -> Duration {
        let delay = self.delay_for(record.failures);
        let Some(last) = record.last_failure else {
            return delay;
        };
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        delay.saturating_sub(elapsed)
    }

    /// Sleep for whatever is still owed at `now`.
    pub async fn wait(&self, record: &FailureRecord, now: DateTime<Utc>) {
        let delay = self.remaining(record, now);
        if !delay.is_zero() {
            debug!(
                failures = record.failures,
                delay_ms = delay.as_millis() as u64,
                "throttling unlock attempt"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Read the stored failure record; a missing key means no failures.
    ///
    /// An unreadable record counts as one failure rather than none.
    pub async fn load(&self, store: &dyn KeyValueStore) -> Result<FailureRecord, PulseError> {
        let Some(raw) = store.get(StoreKey::UnlockFailures.as_ref()).await? else {
            return Ok(FailureRecord::default());
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(error = %e, "unreadable unlock failure record");
                Ok(FailureRecord {
                    failures: 1,
                    last_failure: None,
                })
            }
        }
    }

    /// Persist one more failure on top of `previous`.
    pub async fn record_failure(
        &self,
        store: &dyn KeyValueStore,
        previous: &FailureRecord,
        now: DateTime<Utc>,
    ) -> Result<FailureRecord, PulseError> {
        let record = FailureRecord {
            failures: previous.failures.saturating_add(1),
            last_failure: Some(now),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| PulseError::Internal(format!("failed to serialize failure record: {e}")))?;
        store.set(StoreKey::UnlockFailures.as_ref(), &json).await?;
        Ok(record)
    }

    /// Forget all recorded failures.
    pub async fn clear(&self, store: &dyn KeyValueStore) -> Result<(), PulseError> {
        store.delete(StoreKey::UnlockFailures.as_ref()).await
    }
}
