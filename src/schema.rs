//! Database bootstrap for `sensorgrid`.
//!
//! Opens the SQLite pool and ensures required tables and indexes exist
//! before serving requests. Applied once on startup from `main.rs`.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

// ---

/// Open a connection pool against `url` (e.g. `sqlite:sensorgrid.db`).
///
/// Referential integrity is off by default in SQLite, so every pooled
/// connection opts in via `PRAGMA foreign_keys`. The database file is
/// created on first use; `sqlite::memory:` works for tests.
pub async fn connect_pool(url: &str, max_connections: u32) -> Result<SqlitePool> {
    // ---
    let opts = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await?;

    Ok(pool)
}

/// Create or update the database schema (idempotent).
///
/// Creates the five tables of the measurement model plus indexes on the hot
/// query columns. Safe to call on every startup; no-op if objects already
/// exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS location (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS city (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL,
            location_id INTEGER NOT NULL REFERENCES location (id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS device (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL,
            description TEXT    NOT NULL,
            city_id     INTEGER NOT NULL REFERENCES city (id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Primary keys for this table may be supplied by the caller; see the
    // upsert in `store.rs`.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS value_type (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            type_name TEXT NOT NULL,
            type_unit TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS value (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            time          INTEGER NOT NULL,
            value         REAL    NOT NULL,
            value_type_id INTEGER NOT NULL REFERENCES value_type (id),
            device_id     INTEGER NOT NULL REFERENCES device (id),
            CONSTRAINT value_integrity UNIQUE (time, value_type_id, device_id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Basic indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_value_time
            ON value (time);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_value_device_id
            ON value (device_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
