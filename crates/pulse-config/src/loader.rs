// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pulse.toml` > `~/.config/pulse/pulse.toml` > `/etc/pulse/pulse.toml`
//! with environment variable overrides via the `PULSE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PulseConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/pulse/pulse.toml";

/// Config sections that `PULSE_<SECTION>_<KEY>` variables may target.
const ENV_SECTIONS: &[&str] = &["station", "vault", "storage"];

/// `PULSE_*` variables that are not configuration keys: credentials and the
/// CLI's config file override.
const ENV_IGNORED: &[&str] = &["vault_key", "github_pat", "config"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pulse/pulse.toml`
/// 3. `~/.config/pulse/pulse.toml`
/// 4. `./pulse.toml`
/// 5. `PULSE_*` environment variables
pub fn load_config() -> Result<PulseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pulse/pulse.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pulse.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `PULSE_STATION_DEFAULT_USER` to `station.default_user`.
///
/// Only the leading section name is turned into a dot; key names keep their
/// underscores. Credential variables are ignored.
fn env_provider() -> Env {
    Env::prefixed("PULSE_")
        .ignore(ENV_IGNORED)
        .map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped variable name onto a config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_maps_leading_section_only() {
        assert_eq!(map_env_key("station_default_user"), "station.default_user");
        assert_eq!(map_env_key("vault_kdf_iterations"), "vault.kdf_iterations");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
    }

    #[test]
    fn env_key_without_section_is_untouched() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pulse.toml", "[station]\nworkflow = \"podcast.yml\"\n")?;
            jail.set_env("PULSE_STATION_WORKFLOW", "nightly.yml");
            jail.set_env("PULSE_VAULT_KEY", "not-config");
            jail.set_env("PULSE_CONFIG", "elsewhere.toml");
            let config = load_config_from_path(Path::new("pulse.toml"))?;
            assert_eq!(config.station.workflow, "nightly.yml");
            Ok(())
        });
    }
}
