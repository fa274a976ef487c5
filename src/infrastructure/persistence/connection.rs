//! SQLite connection handling and schema initialization

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        email TEXT,
        created_at TEXT NOT NULL,
        CONSTRAINT uq_account_username UNIQUE (username)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        points REAL,
        level_no INTEGER NOT NULL DEFAULT 1,
        last_seen TEXT,
        CONSTRAINT uq_player_account UNIQUE (account_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        class_rank INTEGER NOT NULL DEFAULT 0,
        parent_id TEXT REFERENCES player_groups(id),
        points REAL NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS group_members (
        group_id TEXT NOT NULL REFERENCES player_groups(id) ON DELETE CASCADE,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        CONSTRAINT uq_group_member UNIQUE (group_id, player_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artifacts (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        CONSTRAINT uq_artifact_name UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spells (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        price REAL NOT NULL DEFAULT 0,
        due_days INTEGER NOT NULL DEFAULT 3,
        CONSTRAINT uq_spell_name UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artifact_holdings (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        artifact_id TEXT NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        amount INTEGER NOT NULL DEFAULT 1,
        CONSTRAINT uq_artifact_holding UNIQUE (player_id, artifact_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_holdings (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        spell_id TEXT NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        amount INTEGER NOT NULL DEFAULT 1,
        CONSTRAINT uq_spell_holding UNIQUE (player_id, spell_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_dues (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        spell_id TEXT NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        source_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        due TEXT NOT NULL,
        CONSTRAINT uq_spell_due UNIQUE (player_id, spell_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_extensions (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        data TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        CONSTRAINT uq_player_extension UNIQUE (player_id, kind)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS score_history (
        id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        coin TEXT NOT NULL,
        amount REAL NOT NULL,
        recorded_at TEXT NOT NULL
    )
    "#,
];

/// Shared SQLite connection pool
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Connect to the database at `url` (e.g. `sqlite:data/guildhall.db`),
    /// creating the file and schema as needed.
    pub async fn new(url: &str) -> Result<Self> {
        if let Some(path) = url.strip_prefix("sqlite:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)
            .context("Invalid SQLite database URL")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        let connection = Self { pool };
        connection.initialize_schema().await?;
        Ok(connection)
    }

    /// In-memory database for tests. A single connection keeps the shared
    /// memory database alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory SQLite URL")?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        let connection = Self { pool };
        connection.initialize_schema().await?;
        Ok(connection)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to initialize database schema")?;
        }
        Ok(())
    }
}
