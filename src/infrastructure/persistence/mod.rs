//! SQLite persistence adapters
//!
//! This module implements the repository pattern over a shared SQLite
//! pool, providing CRUD operations for all domain entities.

mod account_repository;
mod connection;
mod group_repository;
mod magic_repository;
mod player_repository;
mod scoring_repository;

pub use account_repository::SqliteAccountRepository;
pub use connection::SqliteConnection;
pub use group_repository::SqliteGroupRepository;
pub use magic_repository::SqliteMagicRepository;
pub use player_repository::SqlitePlayerRepository;
pub use scoring_repository::SqliteScoringRepository;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Combined repository providing access to all domain repositories
#[derive(Clone)]
pub struct SqliteRepository {
    connection: SqliteConnection,
}

impl SqliteRepository {
    pub async fn new(url: &str) -> Result<Self> {
        let connection = SqliteConnection::new(url).await?;
        Ok(Self { connection })
    }

    /// In-memory repository for tests
    pub async fn in_memory() -> Result<Self> {
        let connection = SqliteConnection::in_memory().await?;
        Ok(Self { connection })
    }

    pub fn accounts(&self) -> SqliteAccountRepository {
        SqliteAccountRepository::new(self.connection.clone())
    }

    pub fn players(&self) -> SqlitePlayerRepository {
        SqlitePlayerRepository::new(self.connection.clone())
    }

    pub fn groups(&self) -> SqliteGroupRepository {
        SqliteGroupRepository::new(self.connection.clone())
    }

    pub fn magic(&self) -> SqliteMagicRepository {
        SqliteMagicRepository::new(self.connection.clone())
    }

    pub fn scoring(&self) -> SqliteScoringRepository {
        SqliteScoringRepository::new(self.connection.clone())
    }
}

/// Parse a TEXT uuid column back into a [`Uuid`]
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Malformed uuid in database: {value}"))
}
