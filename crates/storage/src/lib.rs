use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use shared::domain::CounterValue;

mod settings_store;

pub use settings_store::{SettingsStore, StoreError, StoreRegistry};

const COUNTER_KEY: &str = "main";
const COUNTER_STEP: i64 = 1;
const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// SQLite-backed counter state owned by the counter service.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url).await?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite database url '{database_url}'"))?
            .create_if_missing(true);

        // Every connection to `sqlite::memory:` opens a fresh database, so the
        // pool must keep exactly one connection alive forever.
        let pool_options = if database_url == MEMORY_DATABASE_URL {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counter (
                key   TEXT PRIMARY KEY,
                value INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure counter table exists")?;

        sqlx::query("INSERT OR IGNORE INTO counter (key, value) VALUES (?, 0)")
            .bind(COUNTER_KEY)
            .execute(&self.pool)
            .await
            .context("failed to seed default counter row")?;

        Ok(())
    }

    pub async fn get_count(&self) -> Result<CounterValue> {
        let value: i64 = sqlx::query_scalar("SELECT value FROM counter WHERE key = ?")
            .bind(COUNTER_KEY)
            .fetch_one(&self.pool)
            .await
            .context("failed to read counter value")?;
        Ok(CounterValue(value))
    }

    pub async fn set_count(&self, value: CounterValue) -> Result<CounterValue> {
        let stored: i64 =
            sqlx::query_scalar("UPDATE counter SET value = ? WHERE key = ? RETURNING value")
                .bind(value.0)
                .bind(COUNTER_KEY)
                .fetch_one(&self.pool)
                .await
                .context("failed to set counter value")?;
        Ok(CounterValue(stored))
    }

    pub async fn increment(&self) -> Result<CounterValue> {
        self.add(COUNTER_STEP).await
    }

    pub async fn decrement(&self) -> Result<CounterValue> {
        self.add(-COUNTER_STEP).await
    }

    pub async fn reset(&self) -> Result<CounterValue> {
        self.set_count(CounterValue::BASELINE).await
    }

    async fn add(&self, delta: i64) -> Result<CounterValue> {
        let value: i64 = sqlx::query_scalar(
            "UPDATE counter SET value = value + ? WHERE key = ? RETURNING value",
        )
        .bind(delta)
        .bind(COUNTER_KEY)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to apply counter delta {delta}"))?;
        Ok(CounterValue(value))
    }
}

async fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    tokio::fs::create_dir_all(parent).await.with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == MEMORY_DATABASE_URL || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
