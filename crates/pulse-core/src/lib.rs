// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Pulse Station.
//!
//! This crate provides the error taxonomy, the key-value storage port, and the
//! small set of shared types used by the vault, the station controller, and
//! the CLI. Storage backends implement [`KeyValueStore`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{PulseError, VaultError};
pub use traits::KeyValueStore;
pub use types::{StationTarget, StoreKey};
