// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password and token acquisition via environment variables or a TTY prompt.

use pulse_core::PulseError;
use secrecy::SecretString;

/// Environment variable supplying the vault password non-interactively.
pub const VAULT_KEY_ENV_VAR: &str = "PULSE_VAULT_KEY";

/// Environment variable supplying the GitHub personal access token.
pub const GITHUB_PAT_ENV_VAR: &str = "PULSE_GITHUB_PAT";

/// Vault password from `PULSE_VAULT_KEY`, else a hidden TTY prompt.
pub fn get_vault_password() -> Result<SecretString, PulseError> {
    read_secret(VAULT_KEY_ENV_VAR, "Vault password: ", false)
}

/// Vault password for sealing: the env var, or a prompt asked twice.
pub fn get_vault_password_with_confirm() -> Result<SecretString, PulseError> {
    read_secret(VAULT_KEY_ENV_VAR, "New vault password: ", true)
}

/// GitHub PAT from `PULSE_GITHUB_PAT`, else a hidden TTY prompt.
pub fn get_github_pat() -> Result<SecretString, PulseError> {
    read_secret(GITHUB_PAT_ENV_VAR, "GitHub personal access token: ", false)
}

fn read_secret(env_var: &str, label: &str, confirm: bool) -> Result<SecretString, PulseError> {
    if let Some(value) = env_secret(env_var) {
        return Ok(value);
    }

    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(PulseError::Station(format!(
            "no value provided: set {env_var} or run interactively"
        )));
    }

    let first = prompt(label)?;
    if confirm {
        let second = prompt("Confirm: ")?;
        if first != second {
            return Err(PulseError::Station("entries do not match".to_string()));
        }
    }
    if first.is_empty() {
        return Err(PulseError::Station("empty value not allowed".to_string()));
    }
    Ok(SecretString::from(first))
}

fn env_secret(env_var: &str) -> Option<SecretString> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn prompt(label: &str) -> Result<String, PulseError> {
    rpassword::prompt_password(label)
        .map_err(|e| PulseError::Internal(format!("failed to read from terminal: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn password_from_env_var() {
        // SAFETY: env mutation is serialized across tests.
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "Summer2024!") };
        let result = get_vault_password();
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "Summer2024!");
    }

    #[test]
    #[serial]
    fn confirm_is_skipped_for_env_var() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "Summer2024!") };
        let result = get_vault_password_with_confirm();
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn pat_from_env_var() {
        unsafe { std::env::set_var(GITHUB_PAT_ENV_VAR, "ghp_exampleToken123") };
        let result = get_github_pat();
        unsafe { std::env::remove_var(GITHUB_PAT_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "ghp_exampleToken123");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(VAULT_KEY_ENV_VAR, "") };
        assert!(env_secret(VAULT_KEY_ENV_VAR).is_none());
        unsafe { std::env::remove_var(VAULT_KEY_ENV_VAR) };
    }
}
