// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence backends for Pulse Station.
//!
//! [`SqliteStore`] keeps the station state in a WAL-mode SQLite file with an
//! embedded migration and a single-writer model via `tokio-rusqlite`.
//! [`MemoryStore`] is a process-local map for tests and dry runs.

pub mod database;
pub mod memory;
pub mod migrations;

pub use database::SqliteStore;
pub use memory::MemoryStore;
