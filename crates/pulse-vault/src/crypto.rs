// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.
//! A nonce must never repeat under the same key.

use pulse_core::VaultError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::KEY_LEN;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// Returns `(ciphertext_with_tag, nonce)`.
pub fn seal(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), VaultError> {
    let less_safe = aes_key(key).map_err(|_| seal_failed("failed to create AES-256-GCM key"))?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| seal_failed("failed to generate random nonce"))?;

    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| seal_failed("AES-256-GCM encryption failed"))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate `ciphertext` (which carries the trailing tag).
///
/// Every failure, including a wrong key and a modified ciphertext or nonce,
/// is reported as [`VaultError::UnlockFailed`].
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let less_safe = aes_key(key).map_err(|_| VaultError::UnlockFailed)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = less_safe
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce),
            Aad::empty(),
            in_out.as_mut_slice(),
        )
        .map_err(|_| VaultError::UnlockFailed)?
        .len();

    in_out.truncate(plaintext_len);
    Ok(in_out)
}

fn aes_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, ring::error::Unspecified> {
    UnboundKey::new(&AES_256_GCM, key).map(LessSafeKey::new)
}

fn seal_failed(message: &str) -> VaultError {
    VaultError::SealFailed(message.to_string())
}
