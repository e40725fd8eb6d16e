// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pulse status` command implementation.

use std::io::IsTerminal;

use pulse_core::PulseError;
use pulse_station::{Station, StationState, StationStatus};

/// Run the `pulse status` command.
///
/// With `--json`, prints the status snapshot for scripting. Colors are used
/// only when stdout is a terminal and `--plain` is not given.
pub async fn run_status(station: &Station, json: bool, plain: bool) -> Result<(), PulseError> {
    let status = station.status().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| PulseError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render(&status, use_color));
    }
    Ok(())
}

fn render(status: &StationStatus, use_color: bool) -> String {
    let hint = match status.state {
        StationState::Unconfigured => "Secure a token with: pulse secure",
        StationState::Locked => "Broadcast with: pulse broadcast",
        StationState::Unlocked => "Ready to broadcast",
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str("  pulse status\n");
    out.push_str(&format!("  {}\n", "-".repeat(35)));
    out.push_str(&format!("    State:    {}\n", state_label(status.state, use_color)));
    out.push_str(&format!("    Target:   {}\n", status.target.slug()));
    if status.failed_unlocks > 0 {
        out.push_str(&format!("    Failed:   {} unlock attempt(s)\n", status.failed_unlocks));
    }
    if status.retry_after_ms > 0 {
        let secs = status.retry_after_ms.div_ceil(1_000);
        out.push_str(&format!("    Retry:    in {secs}s\n"));
    }
    out.push('\n');
    out.push_str(&format!("  {hint}\n\n"));
    out
}

fn state_label(state: StationState, use_color: bool) -> String {
    if !use_color {
        let marker = match state {
            StationState::Unlocked => "[OK]",
            StationState::Locked => "[LOCKED]",
            StationState::Unconfigured => "[--]",
        };
        return format!("{marker} {state}");
    }

    use colored::Colorize;
    match state {
        StationState::Unlocked => format!("{} {}", "✓".green(), state.as_ref().green()),
        StationState::Locked => format!("{} {}", "●".yellow(), state.as_ref().yellow()),
        StationState::Unconfigured => format!("{} {}", "✗".red(), state.as_ref().red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::StationTarget;

    fn status(state: StationState) -> StationStatus {
        StationStatus {
            state,
            target: StationTarget {
                user: "sunisankara".into(),
                repo: "ai-pulse-podcast".into(),
            },
            failed_unlocks: 0,
            retry_after_ms: 0,
        }
    }

    #[test]
    fn plain_output_shows_state_and_target() {
        let out = render(&status(StationState::Locked), false);
        assert!(out.contains("State:    [LOCKED] locked"));
        assert!(out.contains("Target:   sunisankara/ai-pulse-podcast"));
        assert!(!out.contains("Failed"));
        assert!(!out.contains("Retry"));
    }

    #[test]
    fn unconfigured_hints_at_secure() {
        let out = render(&status(StationState::Unconfigured), false);
        assert!(out.contains("pulse secure"));
    }

    #[test]
    fn failed_unlocks_are_listed() {
        let mut s = status(StationState::Locked);
        s.failed_unlocks = 3;
        s.retry_after_ms = 1_500;
        let out = render(&s, false);
        assert!(out.contains("Failed:   3 unlock attempt(s)"));
        assert!(out.contains("Retry:    in 2s"));
    }

    #[test]
    fn status_serializes() {
        let json = serde_json::to_string(&status(StationState::Unlocked)).unwrap();
        assert!(json.contains("\"state\":\"unlocked\""));
        assert!(json.contains("\"user\":\"sunisankara\""));
    }
}
