// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pulse Station - operator CLI for the daily AI news podcast.
//!
//! This is the binary entry point: it loads configuration, opens the station
//! store and runs one command against the station controller.

mod commands;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pulse_config::{ConfigError, PulseConfig};
use pulse_core::PulseError;
use pulse_station::Station;
use pulse_storage::SqliteStore;
use tracing::warn;

/// Pulse Station - secure the broadcast token and start the podcast workflow.
#[derive(Parser, Debug)]
#[command(name = "pulse", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, env = "PULSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether the station is unconfigured, locked or unlocked.
    Status {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Seal a GitHub token under a vault password and set the broadcast target.
    Secure {
        /// Repository owner (defaults to the stored or configured owner).
        #[arg(long)]
        user: Option<String>,
        /// Repository name (defaults to the stored or configured repository).
        #[arg(long)]
        repo: Option<String>,
    },
    /// Check the vault password against the sealed token.
    Unlock,
    /// Unlock the station and dispatch the broadcast workflow.
    Broadcast {
        /// Mark the workflow run as a test broadcast.
        #[arg(long)]
        test: bool,
    },
    /// Delete the sealed token and the stored broadcast target.
    Wipe {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            pulse_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.station.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("pulse: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PulseConfig, Vec<ConfigError>> {
    match path {
        Some(path) => pulse_config::load_and_validate_path(path),
        None => pulse_config::load_and_validate(),
    }
}

async fn run(command: Commands, config: &PulseConfig) -> Result<(), PulseError> {
    let store = SqliteStore::open(&config.storage.database_path).await?;
    let mut station = Station::new(Arc::new(store.clone()), config)?;

    let result = match command {
        Commands::Status { json, plain } => status::run_status(&station, json, plain).await,
        Commands::Secure { user, repo } => commands::secure(&mut station, user, repo).await,
        Commands::Unlock => commands::unlock(&mut station).await,
        Commands::Broadcast { test } => commands::broadcast(&mut station, test).await,
        Commands::Wipe { yes } => commands::wipe(&mut station, yes).await,
    };

    drop(station);
    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close station store");
    }
    result
}

/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pulse={log_level},pulse_station={log_level},pulse_vault={log_level},pulse_storage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_broadcast_test_flag() {
        let cli = Cli::try_parse_from(["pulse", "broadcast", "--test"]).unwrap();
        assert!(matches!(cli.command, Commands::Broadcast { test: true }));
    }

    #[test]
    fn parses_secure_target() {
        let cli =
            Cli::try_parse_from(["pulse", "secure", "--user", "octocat", "--repo", "pulse"])
                .unwrap();
        match cli.command {
            Commands::Secure { user, repo } => {
                assert_eq!(user.as_deref(), Some("octocat"));
                assert_eq!(repo.as_deref(), Some("pulse"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    #[serial_test::serial]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["pulse", "wipe", "--yes", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("alt.toml")));
        assert!(matches!(cli.command, Commands::Wipe { yes: true }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["pulse"]).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn config_path_from_env() {
        // SAFETY: env mutation is serialized across tests.
        unsafe { std::env::set_var("PULSE_CONFIG", "/tmp/pulse-test.toml") };
        let cli = Cli::try_parse_from(["pulse", "status"]);
        unsafe { std::env::remove_var("PULSE_CONFIG") };

        assert_eq!(
            cli.unwrap().config.as_deref(),
            Some(Path::new("/tmp/pulse-test.toml"))
        );
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = pulse_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.station.workflow, "podcast.yml");
        assert_eq!(config.vault.kdf_iterations, 100_000);
    }
}
