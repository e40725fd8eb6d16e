// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: seal, open, persist, and wipe the station credential.
//!
//! There is exactly one record slot (`gh_vault`). Sealing always draws a new
//! salt and nonce, so re-sealing with a new password rotates both along with
//! the derived key. Key derivation and AEAD run on the blocking pool; the
//! only suspension points are those calls and the store I/O.

use std::num::NonZeroU32;
use std::sync::Arc;

use pulse_config::model::{VaultConfig, MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use pulse_core::{KeyValueStore, PulseError, StoreKey, VaultError};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::record::SecretVaultRecord;
use crate::{crypto, kdf};

/// The credential vault, bound to a key-value store.
///
/// Holds no key material between calls.
#[derive(Clone)]
pub struct Vault {
    store: Arc<dyn KeyValueStore>,
    iterations: NonZeroU32,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Create a vault over `store` using the configured KDF work factor.
    ///
    /// The count is clamped to the range [`SecretVaultRecord`] accepts on
    /// open, so every record this vault seals can be opened again.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &VaultConfig) -> Self {
        let clamped = config
            .kdf_iterations
            .clamp(MIN_KDF_ITERATIONS, MAX_KDF_ITERATIONS);
        if clamped != config.kdf_iterations {
            warn!(
                configured = config.kdf_iterations,
                used = clamped,
                "kdf iteration count out of range"
            );
        }
        let iterations = NonZeroU32::new(clamped).unwrap_or(NonZeroU32::MIN);
        Self { store, iterations }
    }

    /// PBKDF2 iteration count used for new seals.
    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Encrypt `secret` under a key derived from `password`.
    ///
    /// Nothing is persisted; see [`Vault::seal_and_store`].
    pub async fn seal(
        &self,
        secret: &SecretString,
        password: &SecretString,
    ) -> Result<SecretVaultRecord, VaultError> {
        if secret.expose_secret().is_empty() {
            return Err(VaultError::SealFailed("secret must not be empty".to_string()));
        }
        if password.expose_secret().is_empty() {
            return Err(VaultError::SealFailed("password must not be empty".to_string()));
        }

        let secret_bytes = Zeroizing::new(secret.expose_secret().as_bytes().to_vec());
        let password_bytes = Zeroizing::new(password.expose_secret().as_bytes().to_vec());
        let iterations = self.iterations;

        let record = tokio::task::spawn_blocking(move || -> Result<SecretVaultRecord, VaultError> {
            let salt = kdf::generate_salt()?;
            let key = kdf::derive_key(&password_bytes, &salt, iterations);
            let (ciphertext, nonce) = crypto::seal(&key, &secret_bytes)?;
            Ok(SecretVaultRecord::from_parts(
                &ciphertext,
                &salt,
                &nonce,
                iterations.get(),
            ))
        })
        .await
        .map_err(|e| VaultError::SealFailed(format!("seal task failed: {e}")))??;

        debug!(iterations = iterations.get(), "secret sealed");
        Ok(record)
    }

    /// Decrypt `record` with `password`.
    ///
    /// A wrong password and a corrupted or tampered record both yield
    /// [`VaultError::UnlockFailed`].
    pub async fn open(
        &self,
        record: &SecretVaultRecord,
        password: &SecretString,
    ) -> Result<SecretString, VaultError> {
        let decoded = record.decode()?;
        let password_bytes = Zeroizing::new(password.expose_secret().as_bytes().to_vec());

        let secret = tokio::task::spawn_blocking(move || -> Result<SecretString, VaultError> {
            let key = kdf::derive_key(&password_bytes, &decoded.salt, decoded.iterations);
            let plaintext = crypto::open(&key, &decoded.nonce, &decoded.ciphertext)?;
            let text = std::str::from_utf8(&plaintext).map_err(|_| VaultError::UnlockFailed)?;
            Ok(SecretString::from(text.to_string()))
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "open task failed");
            VaultError::UnlockFailed
        })??;

        debug!("secret opened");
        Ok(secret)
    }

    /// Whether a sealed record is present in the store.
    pub async fn exists(&self) -> Result<bool, PulseError> {
        Ok(self.store.get(StoreKey::Vault.as_ref()).await?.is_some())
    }

    /// Read the stored record, if any.
    pub async fn load(&self) -> Result<Option<SecretVaultRecord>, PulseError> {
        match self.store.get(StoreKey::Vault.as_ref()).await? {
            Some(json) => Ok(Some(SecretVaultRecord::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Seal `secret` and write the record to the store in a single `set`.
    ///
    /// A store failure is reported as [`VaultError::SealFailed`]; the previous
    /// record, if any, is left untouched.
    pub async fn seal_and_store(
        &self,
        secret: &SecretString,
        password: &SecretString,
    ) -> Result<SecretVaultRecord, VaultError> {
        let record = self.seal(secret, password).await?;
        self.store_record(&record).await?;
        Ok(record)
    }

    /// Write an already sealed record, replacing any previous one.
    pub async fn store_record(&self, record: &SecretVaultRecord) -> Result<(), VaultError> {
        let json = record.to_json()?;
        self.store
            .set(StoreKey::Vault.as_ref(), &json)
            .await
            .map_err(|e| VaultError::SealFailed(format!("failed to persist vault record: {e}")))?;

        info!("station credential sealed");
        Ok(())
    }

    /// Read the stored record and open it with `password`.
    ///
    /// Returns `Vault(NotFound)` when nothing has been sealed.
    pub async fn load_and_open(&self, password: &SecretString) -> Result<SecretString, PulseError> {
        let record = self.load().await?.ok_or(VaultError::NotFound)?;
        Ok(self.open(&record, password).await?)
    }

    /// Delete the record and the plaintext target keys.
    ///
    /// Wiping an empty vault is a no-op.
    pub async fn wipe(&self) -> Result<(), PulseError> {
        for key in StoreKey::ALL {
            self.store.delete(key.as_ref()).await?;
        }
        info!("station credentials wiped");
        Ok(())
    }
}

/// Mask a secret for display: `"ghp_...n123"`.
///
/// Values shorter than 10 characters are fully masked.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_storage::MemoryStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn test_vault() -> (Vault, MemoryStore) {
        let store = MemoryStore::new();
        (Vault::new(Arc::new(store.clone()), &VaultConfig::default()), store)
    }

    #[tokio::test]
    async fn seal_open_roundtrip() {
        let (vault, _) = test_vault();
        let record = vault
            .seal(&secret("ghp_exampleToken123"), &secret("Summer2024!"))
            .await
            .unwrap();
        let opened = vault.open(&record, &secret("Summer2024!")).await.unwrap();
        assert_eq!(opened.expose_secret(), "ghp_exampleToken123");
    }

    #[tokio::test]
    async fn seal_rejects_empty_inputs() {
        let (vault, _) = test_vault();
        assert!(matches!(
            vault.seal(&secret(""), &secret("pw")).await,
            Err(VaultError::SealFailed(_))
        ));
        assert!(matches!(
            vault.seal(&secret("token"), &secret("")).await,
            Err(VaultError::SealFailed(_))
        ));
    }

    #[tokio::test]
    async fn seal_does_not_persist() {
        let (vault, store) = test_vault();
        vault.seal(&secret("token"), &secret("pw")).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn record_carries_configured_iterations() {
        let config = VaultConfig {
            kdf_iterations: 150_000,
            ..VaultConfig::default()
        };
        let vault = Vault::new(Arc::new(MemoryStore::new()), &config);
        let record = vault.seal(&secret("token"), &secret("pw")).await.unwrap();
        assert_eq!(record.iterations, Some(150_000));
        let opened = vault.open(&record, &secret("pw")).await.unwrap();
        assert_eq!(opened.expose_secret(), "token");
    }

    #[tokio::test]
    async fn default_config_omits_iterations() {
        let store = MemoryStore::new();
        let vault = Vault::new(Arc::new(store), &VaultConfig::default());
        assert_eq!(vault.iterations(), MIN_KDF_ITERATIONS);
        let record = vault.seal(&secret("token"), &secret("pw")).await.unwrap();
        assert_eq!(record.iterations, None);
    }

    #[test]
    fn configured_iterations_are_clamped() {
        for (configured, used) in [
            (0, MIN_KDF_ITERATIONS),
            (1_000, MIN_KDF_ITERATIONS),
            (u32::MAX, MAX_KDF_ITERATIONS),
        ] {
            let config = VaultConfig {
                kdf_iterations: configured,
                ..VaultConfig::default()
            };
            let vault = Vault::new(Arc::new(MemoryStore::new()), &config);
            assert_eq!(vault.iterations(), used);
        }
    }

    #[tokio::test]
    async fn seal_and_store_overwrites_previous_record() {
        let (vault, store) = test_vault();
        let first = vault
            .seal_and_store(&secret("token-one"), &secret("pw-one"))
            .await
            .unwrap();
        let second = vault
            .seal_and_store(&secret("token-two"), &secret("pw-two"))
            .await
            .unwrap();
        assert_ne!(first.salt, second.salt);
        assert_eq!(store.len().await, 1);

        let stored = vault.load().await.unwrap().unwrap();
        assert_eq!(stored, second);
        assert!(matches!(
            vault.load_and_open(&secret("pw-one")).await,
            Err(PulseError::Vault(VaultError::UnlockFailed))
        ));
        let opened = vault.load_and_open(&secret("pw-two")).await.unwrap();
        assert_eq!(opened.expose_secret(), "token-two");
    }

    #[tokio::test]
    async fn load_and_open_without_record_is_not_found() {
        let (vault, _) = test_vault();
        assert!(!vault.exists().await.unwrap());
        assert!(matches!(
            vault.load_and_open(&secret("pw")).await,
            Err(PulseError::Vault(VaultError::NotFound))
        ));
    }

    #[tokio::test]
    async fn unparseable_stored_record_is_unlock_failed() {
        let (vault, store) = test_vault();
        store.set("gh_vault", "{\"encrypted\": 42}").await.unwrap();
        assert!(matches!(
            vault.load_and_open(&secret("pw")).await,
            Err(PulseError::Vault(VaultError::UnlockFailed))
        ));
    }

    #[tokio::test]
    async fn wipe_removes_all_station_keys() {
        let (vault, store) = test_vault();
        vault.seal_and_store(&secret("token"), &secret("pw")).await.unwrap();
        store.set("gh_user", "octocat").await.unwrap();
        store.set("gh_repo", "pulse").await.unwrap();
        store.set("unrelated", "kept").await.unwrap();

        vault.wipe().await.unwrap();

        assert!(!vault.exists().await.unwrap());
        assert_eq!(store.get("gh_user").await.unwrap(), None);
        assert_eq!(store.get("gh_repo").await.unwrap(), None);
        assert_eq!(store.get("unrelated").await.unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn debug_output_has_no_store_contents() {
        let (vault, _) = test_vault();
        let rendered = format!("{vault:?}");
        assert!(rendered.contains("iterations"));
    }

    #[test]
    fn mask_secret_long_value() {
        assert_eq!(mask_secret("ghp_exampleToken123"), "ghp_...n123");
    }

    #[test]
    fn mask_secret_short_value() {
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_secret_exact_boundary() {
        assert_eq!(mask_secret("1234567890"), "1234...7890");
    }
}
