// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`KeyValueStore`].
//!
//! All statements run on tokio-rusqlite's single background thread, so writes
//! are serialized. Each `set` is one `INSERT OR REPLACE`, which makes a value
//! visible either entirely or not at all.

use std::path::Path;

use async_trait::async_trait;
use pulse_core::{KeyValueStore, PulseError};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::migrations;

/// Station state persisted in a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply migrations.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PulseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(PulseError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;
        let store = Self::initialize(conn).await?;
        debug!(path = %path.display(), "station store opened");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, PulseError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_tr_err)?;
        Self::initialize(conn).await
    }

    async fn initialize(conn: tokio_rusqlite::Connection) -> Result<Self, PulseError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// Close the connection, flushing pending work.
    pub async fn close(self) -> Result<(), PulseError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PulseError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PulseError> {
        let key_owned = key.to_string();
        let value = value.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO kv_store (key, value, updated_at) \
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                    params![key_owned, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, "store value written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PulseError> {
        let key_owned = key.to_string();
        let removed = self
            .conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key_owned])
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, removed, "store value deleted");
        Ok(())
    }
}

/// Convert tokio-rusqlite errors to `PulseError::Storage`.
fn map_tr_err(e: impl std::fmt::Display) -> PulseError {
    PulseError::Storage {
        source: format!("station database error: {e}").into(),
    }
}
