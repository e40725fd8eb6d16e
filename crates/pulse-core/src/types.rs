// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault, the station controller, and the CLI.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Keys of the persisted station state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum StoreKey {
    /// The sealed PAT record (JSON).
    #[strum(serialize = "gh_vault")]
    Vault,
    /// GitHub owner the broadcast targets (plaintext).
    #[strum(serialize = "gh_user")]
    User,
    /// GitHub repository the broadcast targets (plaintext).
    #[strum(serialize = "gh_repo")]
    Repo,
    /// Consecutive failed unlocks and when the last one happened (JSON).
    #[strum(serialize = "gh_unlock_failures")]
    UnlockFailures,
}

impl StoreKey {
    /// Every key owned by the station, in wipe order.
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Vault,
        StoreKey::User,
        StoreKey::Repo,
        StoreKey::UnlockFailures,
    ];
}

/// The GitHub repository a broadcast is dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationTarget {
    pub user: String,
    pub repo: String,
}

impl StationTarget {
    /// `owner/repo` slug.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.user, self.repo)
    }

    /// Web page listing the repository's workflow runs.
    pub fn actions_url(&self) -> String {
        format!("https://github.com/{}/{}/actions", self.user, self.repo)
    }
}
