// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based credential vault for Pulse Station.
//!
//! Seals a single secret (the GitHub personal access token) with AES-256-GCM
//! under a key derived from the operator's password via PBKDF2-HMAC-SHA256.
//! Every seal draws a fresh salt and nonce; the derived key never leaves the
//! call that produced it.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod record;
pub mod vault;

pub use prompt::{get_github_pat, get_vault_password, get_vault_password_with_confirm};
pub use record::SecretVaultRecord;
pub use vault::{mask_secret, Vault};
