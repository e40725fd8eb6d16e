// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port traits implemented by backend crates.
//!
//! All ports use `#[async_trait]` for dynamic dispatch compatibility.

pub mod storage;

pub use storage::KeyValueStore;
