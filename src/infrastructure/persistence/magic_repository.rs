//! Artifact/spell definitions, holdings, and active effect persistence
//!
//! Holding withdrawals are guarded conditional UPDATEs: the decrement only
//! happens when enough stock is present, so two concurrent withdrawals
//! cannot both spend the same stock.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::entities::{Artifact, ArtifactHolding, Spell, SpellDue, SpellHolding};
use crate::domain::value_objects::{ArtifactId, DueId, HoldingId, PlayerId, SpellId};
use crate::infrastructure::persistence::{parse_uuid, SqliteConnection};

type ArtifactRow = (String, String, String, String);
type SpellRow = (String, String, String, String, f64, i64);
type ArtifactHoldingRow = (String, String, String, String, i64);
type SpellHoldingRow = (String, String, String, String, i64);
type DueRow = (String, String, String, String, String, DateTime<Utc>);

pub struct SqliteMagicRepository {
    connection: SqliteConnection,
}

impl SqliteMagicRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    // Artifact definitions

    pub async fn create_artifact(&self, artifact: &Artifact) -> Result<()> {
        sqlx::query(
            "INSERT INTO artifacts (id, name, title, description) VALUES (?, ?, ?, ?)",
        )
        .bind(artifact.id.to_string())
        .bind(&artifact.name)
        .bind(&artifact.title)
        .bind(&artifact.description)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert artifact")?;
        Ok(())
    }

    pub async fn get_artifact_by_name(&self, name: &str) -> Result<Option<Artifact>> {
        let row: Option<ArtifactRow> = sqlx::query_as(
            "SELECT id, name, title, description FROM artifacts WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch artifact")?;

        row.map(row_to_artifact).transpose()
    }

    pub async fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        let rows: Vec<ArtifactRow> = sqlx::query_as(
            "SELECT id, name, title, description FROM artifacts ORDER BY name",
        )
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list artifacts")?;

        rows.into_iter().map(row_to_artifact).collect()
    }

    // Spell definitions

    pub async fn create_spell(&self, spell: &Spell) -> Result<()> {
        sqlx::query(
            "INSERT INTO spells (id, name, title, description, price, due_days) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(spell.id.to_string())
        .bind(&spell.name)
        .bind(&spell.title)
        .bind(&spell.description)
        .bind(spell.price)
        .bind(spell.due_days)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert spell")?;
        Ok(())
    }

    pub async fn get_spell(&self, id: SpellId) -> Result<Option<Spell>> {
        let row: Option<SpellRow> = sqlx::query_as(
            "SELECT id, name, title, description, price, due_days FROM spells WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch spell")?;

        row.map(row_to_spell).transpose()
    }

    pub async fn list_spells(&self) -> Result<Vec<Spell>> {
        let rows: Vec<SpellRow> = sqlx::query_as(
            "SELECT id, name, title, description, price, due_days FROM spells ORDER BY name",
        )
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list spells")?;

        rows.into_iter().map(row_to_spell).collect()
    }

    // Artifact holdings

    pub async fn artifact_holding(
        &self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<Option<ArtifactHolding>> {
        let row: Option<ArtifactHoldingRow> = sqlx::query_as(
            "SELECT h.id, h.player_id, h.artifact_id, a.name, h.amount \
             FROM artifact_holdings h JOIN artifacts a ON a.id = h.artifact_id \
             WHERE h.player_id = ? AND a.name = ?",
        )
        .bind(player_id.to_string())
        .bind(name)
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch artifact holding")?;

        row.map(row_to_artifact_holding).transpose()
    }

    pub async fn insert_artifact_holding(&self, holding: &ArtifactHolding) -> Result<()> {
        sqlx::query(
            "INSERT INTO artifact_holdings (id, player_id, artifact_id, amount) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(holding.id.to_string())
        .bind(holding.player_id.to_string())
        .bind(holding.artifact_id.to_string())
        .bind(holding.amount)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert artifact holding")?;
        Ok(())
    }

    pub async fn increment_artifact_holding(&self, id: HoldingId, delta: i64) -> Result<()> {
        sqlx::query("UPDATE artifact_holdings SET amount = amount + ? WHERE id = ?")
            .bind(delta)
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to increment artifact holding")?;
        Ok(())
    }

    /// Decrement only when enough stock is held. Returns false when the
    /// guard refused the withdrawal.
    pub async fn try_withdraw_artifact(&self, id: HoldingId, amount: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE artifact_holdings SET amount = amount - ? WHERE id = ? AND amount >= ?",
        )
        .bind(amount)
        .bind(id.to_string())
        .bind(amount)
        .execute(self.connection.pool())
        .await
        .context("Failed to withdraw from artifact holding")?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop the row once its amount hits zero. Returns true when deleted.
    pub async fn delete_artifact_holding_if_empty(&self, id: HoldingId) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM artifact_holdings WHERE id = ? AND amount <= 0")
                .bind(id.to_string())
                .execute(self.connection.pool())
                .await
                .context("Failed to delete empty artifact holding")?;
        Ok(result.rows_affected() > 0)
    }

    // Spell holdings

    pub async fn spell_holding(
        &self,
        player_id: PlayerId,
        spell_id: SpellId,
    ) -> Result<Option<SpellHolding>> {
        let row: Option<SpellHoldingRow> = sqlx::query_as(
            "SELECT h.id, h.player_id, h.spell_id, s.name, h.amount \
             FROM spell_holdings h JOIN spells s ON s.id = h.spell_id \
             WHERE h.player_id = ? AND h.spell_id = ?",
        )
        .bind(player_id.to_string())
        .bind(spell_id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch spell holding")?;

        row.map(row_to_spell_holding).transpose()
    }

    pub async fn insert_spell_holding(&self, holding: &SpellHolding) -> Result<()> {
        sqlx::query(
            "INSERT INTO spell_holdings (id, player_id, spell_id, amount) VALUES (?, ?, ?, ?)",
        )
        .bind(holding.id.to_string())
        .bind(holding.player_id.to_string())
        .bind(holding.spell_id.to_string())
        .bind(holding.amount)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert spell holding")?;
        Ok(())
    }

    pub async fn increment_spell_holding(&self, id: HoldingId, delta: i64) -> Result<()> {
        sqlx::query("UPDATE spell_holdings SET amount = amount + ? WHERE id = ?")
            .bind(delta)
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to increment spell holding")?;
        Ok(())
    }

    /// Same guard as [`Self::try_withdraw_artifact`], for spell stock
    pub async fn try_withdraw_spell(&self, id: HoldingId, amount: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE spell_holdings SET amount = amount - ? WHERE id = ? AND amount >= ?",
        )
        .bind(amount)
        .bind(id.to_string())
        .bind(amount)
        .execute(self.connection.pool())
        .await
        .context("Failed to withdraw from spell holding")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_spell_holding_if_empty(&self, id: HoldingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spell_holdings WHERE id = ? AND amount <= 0")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete empty spell holding")?;
        Ok(result.rows_affected() > 0)
    }

    // Active effects

    /// Record an active effect. Returns false when the target already
    /// carries this spell (unique player/spell pair).
    pub async fn insert_spell_due(&self, due: &SpellDue) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO spell_dues (id, player_id, spell_id, source_id, due) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(due.id.to_string())
        .bind(due.player_id.to_string())
        .bind(due.spell_id.to_string())
        .bind(due.source_id.to_string())
        .bind(due.due)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert spell due")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn spell_due(&self, player_id: PlayerId, name: &str) -> Result<Option<SpellDue>> {
        let row: Option<DueRow> = sqlx::query_as(
            "SELECT d.id, d.player_id, d.spell_id, s.name, d.source_id, d.due \
             FROM spell_dues d JOIN spells s ON s.id = d.spell_id \
             WHERE d.player_id = ? AND s.name = ?",
        )
        .bind(player_id.to_string())
        .bind(name)
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch spell due")?;

        row.map(row_to_due).transpose()
    }

    /// All active effects on a player
    pub async fn dues_on(&self, player_id: PlayerId) -> Result<Vec<SpellDue>> {
        let rows: Vec<DueRow> = sqlx::query_as(
            "SELECT d.id, d.player_id, d.spell_id, s.name, d.source_id, d.due \
             FROM spell_dues d JOIN spells s ON s.id = d.spell_id \
             WHERE d.player_id = ? ORDER BY d.due",
        )
        .bind(player_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list spell dues")?;

        rows.into_iter().map(row_to_due).collect()
    }

    pub async fn delete_due(&self, id: DueId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spell_dues WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete spell due")?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear every effect on a player except `keep`. Used by dispel-style
    /// post-cast actions. Returns the number of effects removed.
    pub async fn delete_other_dues(&self, player_id: PlayerId, keep: DueId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM spell_dues WHERE player_id = ? AND id != ?")
            .bind(player_id.to_string())
            .bind(keep.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to clear spell dues")?;
        Ok(result.rows_affected())
    }

    /// Remove every effect past its due timestamp. Returns the purge count.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM spell_dues WHERE due <= ?")
            .bind(now)
            .execute(self.connection.pool())
            .await
            .context("Failed to purge expired spell dues")?;
        Ok(result.rows_affected())
    }
}

fn row_to_artifact(row: ArtifactRow) -> Result<Artifact> {
    let (id, name, title, description) = row;
    Ok(Artifact {
        id: ArtifactId::from(parse_uuid(&id)?),
        name,
        title,
        description,
    })
}

fn row_to_spell(row: SpellRow) -> Result<Spell> {
    let (id, name, title, description, price, due_days) = row;
    Ok(Spell {
        id: SpellId::from(parse_uuid(&id)?),
        name,
        title,
        description,
        price,
        due_days,
    })
}

fn row_to_artifact_holding(row: ArtifactHoldingRow) -> Result<ArtifactHolding> {
    let (id, player_id, artifact_id, artifact_name, amount) = row;
    Ok(ArtifactHolding {
        id: HoldingId::from(parse_uuid(&id)?),
        player_id: PlayerId::from(parse_uuid(&player_id)?),
        artifact_id: ArtifactId::from(parse_uuid(&artifact_id)?),
        artifact_name,
        amount,
    })
}

fn row_to_spell_holding(row: SpellHoldingRow) -> Result<SpellHolding> {
    let (id, player_id, spell_id, spell_name, amount) = row;
    Ok(SpellHolding {
        id: HoldingId::from(parse_uuid(&id)?),
        player_id: PlayerId::from(parse_uuid(&player_id)?),
        spell_id: SpellId::from(parse_uuid(&spell_id)?),
        spell_name,
        amount,
    })
}

fn row_to_due(row: DueRow) -> Result<SpellDue> {
    let (id, player_id, spell_id, spell_name, source_id, due) = row;
    Ok(SpellDue {
        id: DueId::from(parse_uuid(&id)?),
        player_id: PlayerId::from(parse_uuid(&player_id)?),
        spell_id: SpellId::from(parse_uuid(&spell_id)?),
        spell_name,
        source_id: PlayerId::from(parse_uuid(&source_id)?),
        due,
    })
}
