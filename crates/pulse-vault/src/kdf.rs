// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a password.

use std::num::NonZeroU32;

use pulse_core::VaultError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte AES-256-GCM key from `password` and `salt`.
///
/// Deterministic for the same inputs. The returned key is wrapped in
/// [`Zeroizing`] so it is wiped when dropped.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: NonZeroU32,
) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        key.as_mut(),
    );
    key
}

/// Generate a random 16-byte salt from the system CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| VaultError::SealFailed("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iters(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let key1 = derive_key(b"Summer2024!", &salt, iters(1_000));
        let key2 = derive_key(b"Summer2024!", &salt, iters(1_000));
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_password_changes_key() {
        let salt = [7u8; SALT_LEN];
        let key1 = derive_key(b"password one", &salt, iters(1_000));
        let key2 = derive_key(b"password two", &salt, iters(1_000));
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salt_changes_key() {
        let key1 = derive_key(b"same", &[1u8; SALT_LEN], iters(1_000));
        let key2 = derive_key(b"same", &[2u8; SALT_LEN], iters(1_000));
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn iteration_count_changes_key() {
        let salt = [3u8; SALT_LEN];
        let key1 = derive_key(b"same", &salt, iters(1_000));
        let key2 = derive_key(b"same", &salt, iters(1_001));
        assert_ne!(*key1, *key2);
    }

    /// PBKDF2-HMAC-SHA256 for a single 32-byte output block, built from HMAC.
    fn reference_pbkdf2(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
        use ring::hmac;

        let key = hmac::Key::new(hmac::HMAC_SHA256, password);
        let mut block = salt.to_vec();
        block.extend_from_slice(&1u32.to_be_bytes());

        let mut u = hmac::sign(&key, &block);
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(u.as_ref());
        for _ in 1..iterations {
            u = hmac::sign(&key, u.as_ref());
            for (o, b) in out.iter_mut().zip(u.as_ref()) {
                *o ^= b;
            }
        }
        out
    }

    fn counting_salt() -> [u8; SALT_LEN] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn derive_key_matches_known_answers() {
        // PBKDF2-HMAC-SHA256, P="Summer2024!", S=00..0f, dkLen=32.
        let cases: [(u32, [u8; KEY_LEN]); 3] = [
            (1, [
                0xcc, 0x7c, 0x22, 0x76, 0x67, 0x42, 0x7c, 0xfe, 0xd7, 0x3d, 0xae, 0xc2, 0x2c, 0x2a,
                0xe5, 0x41, 0x5a, 0xa3, 0x36, 0x04, 0x31, 0x95, 0x0f, 0x6f, 0x52, 0xbf, 0xdc, 0x1c,
                0x15, 0xc8, 0x50, 0x5a,
            ]),
            (2, [
                0x25, 0x6a, 0x2b, 0x32, 0x6c, 0x76, 0x02, 0x58, 0xb9, 0x69, 0xef, 0x9c, 0xf2, 0x9b,
                0xf8, 0x8b, 0x0c, 0x97, 0x4d, 0x05, 0x9d, 0x2b, 0x0f, 0x7c, 0xc8, 0xe9, 0x24, 0x9e,
                0xba, 0x6d, 0x76, 0xc8,
            ]),
            (1_000, [
                0x24, 0x4b, 0x76, 0x71, 0xbc, 0x2a, 0x40, 0x3e, 0xac, 0xaa, 0xaf, 0x14, 0xa6, 0x52,
                0x6a, 0x0c, 0x56, 0xad, 0x49, 0x8e, 0x94, 0x55, 0x2d, 0xd7, 0x65, 0xd6, 0x00, 0x83,
                0xd5, 0xe1, 0xae, 0x10,
            ]),
        ];
        for (n, expected) in cases {
            let key = derive_key(b"Summer2024!", &counting_salt(), iters(n));
            assert_eq!(*key, expected, "iterations = {n}");
        }
    }

    #[test]
    fn derive_key_matches_hmac_construction() {
        let salt = counting_salt();
        for n in [1, 2, 3, 1_000] {
            let key = derive_key(b"correct horse battery staple", &salt, iters(n));
            assert_eq!(
                *key,
                reference_pbkdf2(b"correct horse battery staple", &salt, n),
                "iterations = {n}"
            );
        }
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
