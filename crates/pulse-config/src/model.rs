// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Pulse Station.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Minimum PBKDF2-HMAC-SHA256 iteration count accepted from configuration.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Maximum PBKDF2 iteration count accepted from configuration or a stored
/// record. Bounds the work a single unlock can be made to do.
pub const MAX_KDF_ITERATIONS: u32 = 10_000_000;

/// Top-level Pulse Station configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    /// Broadcast target and GitHub API settings.
    #[serde(default)]
    pub station: StationConfig,

    /// Credential vault settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Persistent store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Broadcast target and GitHub API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    /// GitHub owner used when none has been stored.
    #[serde(default = "default_user")]
    pub default_user: String,

    /// GitHub repository used when none has been stored.
    #[serde(default = "default_repo")]
    pub default_repo: String,

    /// Workflow file dispatched by a broadcast.
    #[serde(default = "default_workflow")]
    pub workflow: String,

    /// Git ref the workflow runs on.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// GitHub REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            default_repo: default_repo(),
            workflow: default_workflow(),
            branch: default_branch(),
            api_base: default_api_base(),
            log_level: default_log_level(),
        }
    }
}

fn default_user() -> String {
    "sunisankara".to_string()
}

fn default_repo() -> String {
    "ai-pulse-podcast".to_string()
}

fn default_workflow() -> String {
    "podcast.yml".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credential vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count (default and minimum: 100000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Delay before the unlock attempt that follows a first failure, in milliseconds.
    /// Doubles with every further consecutive failure.
    #[serde(default = "default_unlock_backoff_ms")]
    pub unlock_backoff_ms: u64,

    /// Upper bound on the unlock delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            unlock_backoff_ms: default_unlock_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

fn default_unlock_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

/// Persistent store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the station state.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("pulse").join("pulse.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("pulse.db"))
        .to_string_lossy()
        .into_owned()
}
