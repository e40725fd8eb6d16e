// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted form of a sealed secret.
//!
//! Stored as one JSON object under `gh_vault`:
//!
//! ```json
//! { "encrypted": "<base64>", "salt": "<base64>", "iv": "<base64>" }
//! ```
//!
//! Records sealed with a non-default PBKDF2 iteration count also carry
//! `"iterations"`; records without it were sealed with the default. A count
//! outside `MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS` is never honoured.

use std::num::NonZeroU32;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pulse_config::model::{MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use pulse_core::VaultError;
use serde::{Deserialize, Serialize};

use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::kdf::SALT_LEN;

/// A sealed secret: ciphertext, salt, and nonce as base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretVaultRecord {
    /// AES-256-GCM output including the authentication tag.
    #[serde(rename = "encrypted")]
    pub ciphertext: String,
    /// PBKDF2 salt (16 bytes).
    pub salt: String,
    /// AES-GCM nonce (12 bytes).
    pub iv: String,
    /// PBKDF2 iteration count, omitted when it equals the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

/// Binary fields of a record, validated for length.
pub(crate) struct DecodedRecord {
    pub ciphertext: Vec<u8>,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub iterations: NonZeroU32,
}

impl SecretVaultRecord {
    /// Encode the binary parts produced by a seal.
    pub fn from_parts(
        ciphertext: &[u8],
        salt: &[u8; SALT_LEN],
        nonce: &[u8; NONCE_LEN],
        iterations: u32,
    ) -> Self {
        Self {
            ciphertext: BASE64.encode(ciphertext),
            salt: BASE64.encode(salt),
            iv: BASE64.encode(nonce),
            iterations: (iterations != MIN_KDF_ITERATIONS).then_some(iterations),
        }
    }

    /// PBKDF2 iteration count this record was sealed with.
    pub fn kdf_iterations(&self) -> u32 {
        self.iterations.unwrap_or(MIN_KDF_ITERATIONS)
    }

    /// Decode and length-check the binary parts.
    ///
    /// Any malformed field is reported as [`VaultError::UnlockFailed`], the
    /// same signal a wrong password produces. That includes an iteration
    /// count below the configured floor or above the ceiling, so a stored
    /// record cannot lower the work factor or stall an unlock.
    pub(crate) fn decode(&self) -> Result<DecodedRecord, VaultError> {
        let ciphertext = BASE64
            .decode(&self.ciphertext)
            .map_err(|_| VaultError::UnlockFailed)?;
        if ciphertext.len() < TAG_LEN {
            return Err(VaultError::UnlockFailed);
        }

        let salt: [u8; SALT_LEN] = BASE64
            .decode(&self.salt)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(VaultError::UnlockFailed)?;
        let nonce: [u8; NONCE_LEN] = BASE64
            .decode(&self.iv)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(VaultError::UnlockFailed)?;

        let iterations = Some(self.kdf_iterations())
            .filter(|n| (MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(n))
            .and_then(NonZeroU32::new)
            .ok_or(VaultError::UnlockFailed)?;

        Ok(DecodedRecord {
            ciphertext,
            salt,
            nonce,
            iterations,
        })
    }

    /// Serialize to the stored JSON form.
    pub fn to_json(&self) -> Result<String, VaultError> {
        serde_json::to_string(self)
            .map_err(|e| VaultError::SealFailed(format!("failed to serialize vault record: {e}")))
    }

    /// Parse the stored JSON form. Unparseable input is `UnlockFailed`.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        serde_json::from_str(json).map_err(|_| VaultError::UnlockFailed)
    }
}
