// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The station controller: secures, unlocks and broadcasts.
//!
//! The station is `Unconfigured` until a credential has been sealed, `Locked`
//! while the sealed record exists but the PAT is not in memory, and
//! `Unlocked` after a successful unlock. Only an unlocked station can
//! broadcast. The PAT is held as a [`SecretString`] and dropped on lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pulse_config::model::PulseConfig;
use pulse_core::{KeyValueStore, PulseError, StationTarget, StoreKey, VaultError};
use pulse_vault::{SecretVaultRecord, Vault};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::{info, warn};

use crate::dispatcher::GithubDispatcher;
use crate::throttle::UnlockThrottle;

/// Lock state of the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StationState {
    Unconfigured,
    Locked,
    Unlocked,
}

/// Snapshot reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub state: StationState,
    pub target: StationTarget,
    pub failed_unlocks: u32,
    /// Milliseconds until the next unlock attempt is allowed.
    pub retry_after_ms: u64,
}

/// Controls the broadcast credential and dispatches the workflow.
pub struct Station {
    store: Arc<dyn KeyValueStore>,
    vault: Vault,
    dispatcher: GithubDispatcher,
    throttle: UnlockThrottle,
    defaults: StationTarget,
    active_pat: Option<SecretString>,
}

impl std::fmt::Debug for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("vault", &self.vault)
            .field("defaults", &self.defaults)
            .field("unlocked", &self.is_unlocked())
            .finish_non_exhaustive()
    }
}

impl Station {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &PulseConfig) -> Result<Self, PulseError> {
        Ok(Self {
            vault: Vault::new(Arc::clone(&store), &config.vault),
            dispatcher: GithubDispatcher::new(&config.station)?,
            throttle: UnlockThrottle::new(&config.vault),
            defaults: StationTarget {
                user: config.station.default_user.clone(),
                repo: config.station.default_repo.clone(),
            },
            store,
            active_pat: None,
        })
    }

    pub fn is_unlocked(&self) -> bool {
        self.active_pat.is_some()
    }

    pub async fn status(&self) -> Result<StationStatus, PulseError> {
        let state = if self.is_unlocked() {
            StationState::Unlocked
        } else if self.vault.exists().await? {
            StationState::Locked
        } else {
            StationState::Unconfigured
        };
        let failures = self.throttle.load(self.store.as_ref()).await?;
        Ok(StationStatus {
            state,
            target: self.target().await?,
            failed_unlocks: failures.failures,
            retry_after_ms: self.throttle.remaining(&failures, Utc::now()).as_millis() as u64,
        })
    }

    /// Delay owed by earlier failed unlocks before the next attempt.
    pub async fn unlock_delay(&self) -> Result<Duration, PulseError> {
        let failures = self.throttle.load(self.store.as_ref()).await?;
        Ok(self.throttle.remaining(&failures, Utc::now()))
    }

    /// The stored broadcast target, falling back to the configured defaults.
    pub async fn target(&self) -> Result<StationTarget, PulseError> {
        let user = self.stored_or(StoreKey::User, &self.defaults.user).await?;
        let repo = self.stored_or(StoreKey::Repo, &self.defaults.repo).await?;
        Ok(StationTarget { user, repo })
    }

    async fn stored_or(&self, key: StoreKey, default: &str) -> Result<String, PulseError> {
        Ok(self
            .store
            .get(key.as_ref())
            .await?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// Seal `pat` under `password` and record the broadcast target.
    ///
    /// The target keys are written before the sealed record. If any write
    /// fails, the target keys already written are restored and the previous
    /// record, if any, stays in place. The station ends locked; any
    /// previously unlocked PAT is dropped.
    pub async fn secure(
        &mut self,
        pat: &SecretString,
        password: &SecretString,
        user: &str,
        repo: &str,
    ) -> Result<StationTarget, PulseError> {
        let pat = SecretString::from(pat.expose_secret().trim().to_string());
        let (user, repo) = (user.trim(), repo.trim());
        if pat.expose_secret().is_empty()
            || password.expose_secret().is_empty()
            || user.is_empty()
            || repo.is_empty()
        {
            return Err(PulseError::Station(
                "setup incomplete: provide token, repository owner, repository and password"
                    .to_string(),
            ));
        }

        let record = self.vault.seal(&pat, password).await?;
        self.commit(&record, user, repo).await?;

        self.lock();
        if let Err(e) = self.throttle.clear(self.store.as_ref()).await {
            warn!(error = %e, "failed to clear unlock failures");
        }

        let target = StationTarget {
            user: user.to_string(),
            repo: repo.to_string(),
        };
        info!(repo = %target.slug(), "station secured");
        Ok(target)
    }

    async fn commit(
        &self,
        record: &SecretVaultRecord,
        user: &str,
        repo: &str,
    ) -> Result<(), PulseError> {
        let mut written: Vec<(StoreKey, Option<String>)> = Vec::with_capacity(2);
        for (key, value) in [(StoreKey::User, user), (StoreKey::Repo, repo)] {
            let step = async {
                let previous = self.store.get(key.as_ref()).await?;
                self.store.set(key.as_ref(), value).await?;
                Ok::<_, PulseError>(previous)
            }
            .await;
            match step {
                Ok(previous) => written.push((key, previous)),
                Err(e) => {
                    self.rollback(written).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.vault.store_record(record).await {
            self.rollback(written).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn rollback(&self, written: Vec<(StoreKey, Option<String>)>) {
        for (key, previous) in written.into_iter().rev() {
            let result = match previous {
                Some(value) => self.store.set(key.as_ref(), &value).await,
                None => self.store.delete(key.as_ref()).await,
            };
            if let Err(e) = result {
                warn!(key = %key, error = %e, "failed to restore broadcast target");
            }
        }
    }

    /// Open the vault with `password` and keep the PAT in memory.
    ///
    /// Waits out the backoff owed by earlier failures, including failures
    /// recorded by a previous process, before trying.
    pub async fn unlock(&mut self, password: &SecretString) -> Result<(), PulseError> {
        let store = Arc::clone(&self.store);
        let failures = self.throttle.load(store.as_ref()).await?;
        self.throttle.wait(&failures, Utc::now()).await;

        match self.vault.load_and_open(password).await {
            Ok(pat) => {
                self.active_pat = Some(pat);
                if failures.failures > 0 {
                    self.throttle.clear(store.as_ref()).await?;
                }
                info!("station unlocked");
                Ok(())
            }
            Err(PulseError::Vault(VaultError::UnlockFailed)) => {
                let updated = self
                    .throttle
                    .record_failure(store.as_ref(), &failures, Utc::now())
                    .await?;
                warn!(failures = updated.failures, "unlock attempt failed");
                Err(VaultError::UnlockFailed.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the in-memory PAT.
    pub fn lock(&mut self) {
        if self.active_pat.take().is_some() {
            info!("station locked");
        }
    }

    /// Dispatch the broadcast workflow and return the workflow runs page.
    pub async fn broadcast(&self, test_mode: bool) -> Result<String, PulseError> {
        let pat = self
            .active_pat
            .as_ref()
            .ok_or_else(|| PulseError::Station("unlock station first".to_string()))?;
        let target = self.target().await?;
        self.dispatcher.dispatch(&target, pat, test_mode).await?;
        Ok(target.actions_url())
    }

    /// Delete the sealed credential, the stored target and the failure
    /// record, then lock.
    pub async fn wipe(&mut self) -> Result<(), PulseError> {
        self.vault.wipe().await?;
        self.lock();
        Ok(())
    }
}
