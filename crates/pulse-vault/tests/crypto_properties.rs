// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests over the synchronous KDF and AEAD layer.

use std::num::NonZeroU32;

use proptest::prelude::*;
use pulse_core::VaultError;
use pulse_vault::{crypto, kdf};

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(1_000).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn open_inverts_seal(secret in "\\PC{1,200}", password in "\\PC{1,40}", salt in any::<[u8; 16]>()) {
        let key = kdf::derive_key(password.as_bytes(), &salt, iterations());
        let (ciphertext, nonce) = crypto::seal(&key, secret.as_bytes()).unwrap();
        let opened = crypto::open(&key, &nonce, &ciphertext).unwrap();
        prop_assert_eq!(opened.as_slice(), secret.as_bytes());
    }

    #[test]
    fn any_ciphertext_bit_flip_is_rejected(
        secret in "\\PC{1,64}",
        salt in any::<[u8; 16]>(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = kdf::derive_key(b"Summer2024!", &salt, iterations());
        let (mut ciphertext, nonce) = crypto::seal(&key, secret.as_bytes()).unwrap();
        let idx = position.index(ciphertext.len());
        ciphertext[idx] ^= 1 << bit;
        prop_assert!(matches!(
            crypto::open(&key, &nonce, &ciphertext),
            Err(VaultError::UnlockFailed)
        ));
    }

    #[test]
    fn distinct_passwords_derive_distinct_keys(
        a in "\\PC{1,32}",
        b in "\\PC{1,32}",
        salt in any::<[u8; 16]>(),
    ) {
        prop_assume!(a != b);
        let ka = kdf::derive_key(a.as_bytes(), &salt, iterations());
        let kb = kdf::derive_key(b.as_bytes(), &salt, iterations());
        prop_assert_ne!(*ka, *kb);
    }
}
