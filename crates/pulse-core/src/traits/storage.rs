// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String-keyed persistent store port.

use async_trait::async_trait;

use crate::error::PulseError;

/// A persistent key-value store addressed by string keys.
///
/// Every `set` replaces the whole value for its key in one write; readers
/// never observe a partially written value. Deleting a missing key is a no-op.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, PulseError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), PulseError>;

    /// Removes `key`. Succeeds when the key does not exist.
    async fn delete(&self, key: &str) -> Result<(), PulseError>;
}
