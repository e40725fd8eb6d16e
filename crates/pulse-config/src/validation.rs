// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::{PulseConfig, MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &PulseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let station = &config.station;
    for (name, value) in [
        ("station.default_user", &station.default_user),
        ("station.default_repo", &station.default_repo),
        ("station.workflow", &station.workflow),
        ("station.branch", &station.branch),
        ("station.api_base", &station.api_base),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{name} must not be empty")));
        }
    }

    let workflow = station.workflow.trim();
    if !workflow.is_empty() && !(workflow.ends_with(".yml") || workflow.ends_with(".yaml")) {
        errors.push(ConfigError::validation(format!(
            "station.workflow `{workflow}` must name a .yml or .yaml workflow file"
        )));
    }

    let api_base = station.api_base.trim();
    if !api_base.is_empty() && !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
        errors.push(ConfigError::validation(format!(
            "station.api_base `{api_base}` must be an http(s) URL"
        )));
    }

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        )));
    }
    if config.vault.kdf_iterations > MAX_KDF_ITERATIONS {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be at most {MAX_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        )));
    }

    if config.vault.max_backoff_ms < config.vault.unlock_backoff_ms {
        errors.push(ConfigError::validation(format!(
            "vault.max_backoff_ms ({}) must not be below vault.unlock_backoff_ms ({})",
            config.vault.max_backoff_ms, config.vault.unlock_backoff_ms
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&PulseConfig::default()).is_ok());
    }

    #[test]
    fn weak_kdf_fails_validation() {
        let mut config = PulseConfig::default();
        config.vault.kdf_iterations = 10_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "kdf_iterations"));
    }

    #[test]
    fn stronger_kdf_is_accepted() {
        let mut config = PulseConfig::default();
        config.vault.kdf_iterations = 600_000;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn runaway_kdf_fails_validation() {
        let mut config = PulseConfig::default();
        config.vault.kdf_iterations = u32::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "at most 10000000"));

        config.vault.kdf_iterations = MAX_KDF_ITERATIONS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_repo_fails_validation() {
        let mut config = PulseConfig::default();
        config.station.default_repo = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "station.default_repo"));
    }

    #[test]
    fn workflow_must_be_yaml() {
        let mut config = PulseConfig::default();
        config.station.workflow = "podcast.json".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, ".yml"));
    }

    #[test]
    fn inverted_backoff_fails_validation() {
        let mut config = PulseConfig::default();
        config.vault.unlock_backoff_ms = 10_000;
        config.vault.max_backoff_ms = 100;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "max_backoff_ms"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = PulseConfig::default();
        config.vault.kdf_iterations = 1;
        config.storage.database_path = String::new();
        config.station.api_base = "ftp://example".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
