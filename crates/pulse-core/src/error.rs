// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Pulse Station.

use thiserror::Error;

/// Failures surfaced by the credential vault.
///
/// `UnlockFailed` carries no detail: a wrong password and a
/// tampered or corrupted record must be indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Sealing failed (empty input, CSPRNG or cipher failure, storage write).
    /// Nothing was persisted.
    #[error("seal failed: {0}")]
    SealFailed(String),

    /// Wrong password, or the stored record is corrupted or tampered with.
    #[error("decryption failed")]
    UnlockFailed,

    /// No record has been sealed yet.
    #[error("no sealed credential found")]
    NotFound,
}

/// The primary error type used across all Pulse Station crates.
#[derive(Debug, Error)]
pub enum PulseError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Credential vault errors.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Broadcast dispatch errors (HTTP failure, rejected workflow run).
    #[error("dispatch refused: {message}")]
    Dispatch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Station controller precondition failures (incomplete setup, still locked).
    #[error("station error: {0}")]
    Station(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PulseError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
