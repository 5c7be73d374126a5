//! SQLite-backed key-value store (`storyproof.db`).
//!
//! A single `kv` table holds every record. Each operation is one SQL
//! statement, so SQLite's statement atomicity gives the all-or-nothing write
//! the [`KeyValueStore`] contract asks for, including across processes that
//! share the same database file.

use super::{KeyValueStore, KvError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
)";

#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Open (creating if needed) a database file.
    pub async fn open(path: &Path) -> Result<Self, KvError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. Lives as long as this store.
    pub async fn in_memory() -> Result<Self, KvError> {
        // One connection that never idles out, otherwise the database vanishes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, KvError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let value = sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, KvError> {
        let result = match expected {
            None => {
                sqlx::query(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO NOTHING",
                )
                .bind(key)
                .bind(new)
                .execute(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query("UPDATE kv SET value = ?1 WHERE key = ?2 AND value = ?3")
                    .bind(new)
                    .bind(key)
                    .bind(expected)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected() == 1)
    }
}
