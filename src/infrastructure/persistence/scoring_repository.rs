//! Score history persistence - the coin ledger

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::entities::HistoryEntry;
use crate::domain::value_objects::PlayerId;
use crate::infrastructure::persistence::SqliteConnection;

pub struct SqliteScoringRepository {
    connection: SqliteConnection,
}

impl SqliteScoringRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    pub async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO score_history (id, player_id, coin, amount, recorded_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.player_id.to_string())
        .bind(&entry.coin)
        .bind(entry.amount)
        .bind(entry.recorded_at)
        .execute(self.connection.pool())
        .await
        .context("Failed to append score history entry")?;
        Ok(())
    }

    /// Per-coin totals for a player
    pub async fn user_coins(&self, player_id: PlayerId) -> Result<Vec<(String, f64)>> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT coin, COALESCE(SUM(amount), 0.0) FROM score_history \
             WHERE player_id = ? GROUP BY coin ORDER BY coin",
        )
        .bind(player_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to sum coins")?;
        Ok(rows)
    }

    /// Points scored since `since`, for windowed leaderboards
    pub async fn points_since(&self, player_id: PlayerId, since: DateTime<Utc>) -> Result<f64> {
        let (total,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0.0) FROM score_history \
             WHERE player_id = ? AND coin = 'points' AND recorded_at >= ?",
        )
        .bind(player_id.to_string())
        .bind(since)
        .fetch_one(self.connection.pool())
        .await
        .context("Failed to sum recent points")?;
        Ok(total)
    }
}
