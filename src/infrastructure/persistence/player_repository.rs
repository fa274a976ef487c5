//! Player and player-extension persistence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::entities::{Account, Player, PlayerExtension};
use crate::domain::value_objects::{AccountId, ExtensionId, PlayerId};
use crate::infrastructure::persistence::{parse_uuid, SqliteConnection};

type PlayerRow = (String, String, Option<f64>, i64, Option<DateTime<Utc>>);
type ProfileRow = (
    String,
    String,
    Option<f64>,
    i64,
    Option<DateTime<Utc>>,
    String,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
);

const PLAYER_COLUMNS: &str = "id, account_id, points, level_no, last_seen";

const PROFILE_SELECT: &str = "SELECT p.id, p.account_id, p.points, p.level_no, p.last_seen, \
     a.username, a.first_name, a.last_name, a.email, a.created_at \
     FROM players p JOIN accounts a ON a.id = p.account_id";

pub struct SqlitePlayerRepository {
    connection: SqliteConnection,
}

impl SqlitePlayerRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    pub async fn create(&self, player: &Player) -> Result<()> {
        sqlx::query(
            "INSERT INTO players (id, account_id, points, level_no, last_seen) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(player.id.to_string())
        .bind(player.account_id.to_string())
        .bind(player.points)
        .bind(player.level_no)
        .bind(player.last_seen)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert player")?;
        Ok(())
    }

    pub async fn get(&self, id: PlayerId) -> Result<Option<Player>> {
        let row: Option<PlayerRow> = sqlx::query_as(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch player")?;

        row.map(row_to_player).transpose()
    }

    pub async fn get_by_account(&self, account_id: AccountId) -> Result<Option<Player>> {
        let row: Option<PlayerRow> = sqlx::query_as(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE account_id = ?"
        ))
        .bind(account_id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch player by account")?;

        row.map(row_to_player).transpose()
    }

    pub async fn update(&self, player: &Player) -> Result<()> {
        sqlx::query(
            "UPDATE players SET points = ?, level_no = ?, last_seen = ? WHERE id = ?",
        )
        .bind(player.points)
        .bind(player.level_no)
        .bind(player.last_seen)
        .bind(player.id.to_string())
        .execute(self.connection.pool())
        .await
        .context("Failed to update player")?;
        Ok(())
    }

    /// All players joined with their accounts, for leaderboards
    pub async fn list_with_accounts(&self) -> Result<Vec<(Account, Player)>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(PROFILE_SELECT)
            .fetch_all(self.connection.pool())
            .await
            .context("Failed to list players")?;

        rows.into_iter().map(row_to_profile).collect()
    }

    /// Substring search over username and real name
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<(Account, Player)>> {
        let pattern = format!("%{}%", query);
        let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
            "{PROFILE_SELECT} \
             WHERE a.username LIKE ? OR a.first_name LIKE ? OR a.last_name LIKE ? \
             ORDER BY a.username LIMIT ?"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to search players")?;

        rows.into_iter().map(row_to_profile).collect()
    }

    pub async fn get_extension(
        &self,
        player_id: PlayerId,
        kind: &str,
    ) -> Result<Option<PlayerExtension>> {
        let row: Option<(String, String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, player_id, kind, data, created_at \
             FROM player_extensions WHERE player_id = ? AND kind = ?",
        )
        .bind(player_id.to_string())
        .bind(kind)
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch player extension")?;

        row.map(|(id, player_id, kind, data, created_at)| {
            Ok(PlayerExtension {
                id: ExtensionId::from(parse_uuid(&id)?),
                player_id: PlayerId::from(parse_uuid(&player_id)?),
                kind,
                data: serde_json::from_str(&data)
                    .context("Malformed extension payload in database")?,
                created_at,
            })
        })
        .transpose()
    }

    pub async fn insert_extension(&self, extension: &PlayerExtension) -> Result<()> {
        sqlx::query(
            "INSERT INTO player_extensions (id, player_id, kind, data, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(extension.id.to_string())
        .bind(extension.player_id.to_string())
        .bind(&extension.kind)
        .bind(extension.data.to_string())
        .bind(extension.created_at)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert player extension")?;
        Ok(())
    }
}

fn row_to_player(row: PlayerRow) -> Result<Player> {
    let (id, account_id, points, level_no, last_seen) = row;
    Ok(Player {
        id: PlayerId::from(parse_uuid(&id)?),
        account_id: AccountId::from(parse_uuid(&account_id)?),
        points,
        level_no,
        last_seen,
    })
}

fn row_to_profile(row: ProfileRow) -> Result<(Account, Player)> {
    let (id, account_id, points, level_no, last_seen, username, first_name, last_name, email, created_at) =
        row;
    let player = Player {
        id: PlayerId::from(parse_uuid(&id)?),
        account_id: AccountId::from(parse_uuid(&account_id)?),
        points,
        level_no,
        last_seen,
    };
    let account = Account {
        id: player.account_id,
        username,
        first_name,
        last_name,
        email,
        created_at,
    };
    Ok((account, player))
}
