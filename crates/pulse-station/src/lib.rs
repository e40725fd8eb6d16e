// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Station controller for Pulse Station.
//!
//! [`Station`] gates the broadcast on the credential vault: the GitHub PAT is
//! sealed at rest, opened into memory by `unlock`, and used by
//! [`GithubDispatcher`] to start the podcast workflow.

pub mod dispatcher;
pub mod station;
pub mod throttle;

pub use dispatcher::GithubDispatcher;
pub use station::{Station, StationState, StationStatus};
pub use throttle::{FailureRecord, UnlockThrottle};
