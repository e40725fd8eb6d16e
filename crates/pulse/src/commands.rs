// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pulse secure`, `unlock`, `broadcast` and `wipe` command implementations.
//!
//! Secrets come from `PULSE_GITHUB_PAT` / `PULSE_VAULT_KEY` or a hidden
//! terminal prompt. Only a masked form of the token is ever printed.

use std::io::{BufRead, IsTerminal, Write};

use pulse_core::PulseError;
use pulse_station::Station;
use pulse_vault::{get_github_pat, get_vault_password, get_vault_password_with_confirm, mask_secret};
use secrecy::ExposeSecret;

/// Seal a token and record the broadcast target.
pub async fn secure(
    station: &mut Station,
    user: Option<String>,
    repo: Option<String>,
) -> Result<(), PulseError> {
    let current = station.target().await?;
    let user = user.unwrap_or(current.user);
    let repo = repo.unwrap_or(current.repo);

    let pat = get_github_pat()?;
    let password = get_vault_password_with_confirm()?;

    let target = station.secure(&pat, &password, &user, &repo).await?;
    println!(
        "Station secured for {} (token {}).",
        target.slug(),
        mask_secret(pat.expose_secret().trim())
    );
    Ok(())
}

/// Verify the vault password.
pub async fn unlock(station: &mut Station) -> Result<(), PulseError> {
    let password = get_vault_password()?;
    station.unlock(&password).await?;
    println!("Station unlocked.");
    Ok(())
}

/// Unlock and start the broadcast workflow.
pub async fn broadcast(station: &mut Station, test_mode: bool) -> Result<(), PulseError> {
    let password = get_vault_password()?;
    station.unlock(&password).await?;

    let url = station.broadcast(test_mode).await;
    station.lock();
    let url = url?;

    let kind = if test_mode { "Test broadcast" } else { "Broadcast" };
    println!("{kind} command accepted. Follow the run at {url}");
    Ok(())
}

/// Delete the sealed credential after confirmation.
pub async fn wipe(station: &mut Station, yes: bool) -> Result<(), PulseError> {
    if !yes && !confirm_wipe()? {
        println!("Wipe cancelled.");
        return Ok(());
    }
    station.wipe().await?;
    println!("Station reset.");
    Ok(())
}

fn confirm_wipe() -> Result<bool, PulseError> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(PulseError::Station(
            "refusing to wipe without confirmation: pass --yes".to_string(),
        ));
    }

    print!("WARNING: this deletes the sealed token and broadcast target. Proceed? [y/N] ");
    std::io::stdout()
        .flush()
        .map_err(|e| PulseError::Internal(format!("failed to write prompt: {e}")))?;

    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(|e| PulseError::Internal(format!("failed to read confirmation: {e}")))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
