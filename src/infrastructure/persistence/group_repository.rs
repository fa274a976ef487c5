//! Player group persistence and hierarchy queries

use anyhow::{Context, Result};

use crate::domain::entities::PlayerGroup;
use crate::domain::value_objects::{GroupId, PlayerId};
use crate::infrastructure::persistence::{parse_uuid, SqliteConnection};

type GroupRow = (String, String, i64, Option<String>, f64);

const GROUP_COLUMNS: &str = "id, name, class_rank, parent_id, points";

pub struct SqliteGroupRepository {
    connection: SqliteConnection,
}

impl SqliteGroupRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    pub async fn create(&self, group: &PlayerGroup) -> Result<()> {
        sqlx::query(
            "INSERT INTO player_groups (id, name, class_rank, parent_id, points) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(group.id.to_string())
        .bind(&group.name)
        .bind(group.class_rank)
        .bind(group.parent_id.map(|id| id.to_string()))
        .bind(group.points)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert group")?;
        Ok(())
    }

    pub async fn get(&self, id: GroupId) -> Result<Option<PlayerGroup>> {
        let row: Option<GroupRow> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM player_groups WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch group")?;

        row.map(row_to_group).transpose()
    }

    pub async fn update(&self, group: &PlayerGroup) -> Result<()> {
        sqlx::query(
            "UPDATE player_groups SET name = ?, class_rank = ?, parent_id = ?, points = ? \
             WHERE id = ?",
        )
        .bind(&group.name)
        .bind(group.class_rank)
        .bind(group.parent_id.map(|id| id.to_string()))
        .bind(group.points)
        .bind(group.id.to_string())
        .execute(self.connection.pool())
        .await
        .context("Failed to update group")?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<PlayerGroup>> {
        let rows: Vec<GroupRow> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM player_groups ORDER BY class_rank, name"
        ))
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list groups")?;

        rows.into_iter().map(row_to_group).collect()
    }

    /// Direct subgroups of a group
    pub async fn children(&self, id: GroupId) -> Result<Vec<PlayerGroup>> {
        let rows: Vec<GroupRow> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM player_groups WHERE parent_id = ? ORDER BY name"
        ))
        .bind(id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list child groups")?;

        rows.into_iter().map(row_to_group).collect()
    }

    /// Root groups sharing a class rank, excluding `except`
    pub async fn roots_with_rank(
        &self,
        class_rank: i64,
        except: GroupId,
    ) -> Result<Vec<PlayerGroup>> {
        let rows: Vec<GroupRow> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM player_groups \
             WHERE parent_id IS NULL AND class_rank = ? AND id != ? ORDER BY name"
        ))
        .bind(class_rank)
        .bind(except.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list peer groups")?;

        rows.into_iter().map(row_to_group).collect()
    }

    /// Children of `parent`, excluding `except`
    pub async fn siblings_under(
        &self,
        parent: GroupId,
        except: GroupId,
    ) -> Result<Vec<PlayerGroup>> {
        let rows: Vec<GroupRow> = sqlx::query_as(&format!(
            "SELECT {GROUP_COLUMNS} FROM player_groups \
             WHERE parent_id = ? AND id != ? ORDER BY name"
        ))
        .bind(parent.to_string())
        .bind(except.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list sibling groups")?;

        rows.into_iter().map(row_to_group).collect()
    }

    pub async fn add_member(&self, group_id: GroupId, player_id: PlayerId) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO group_members (group_id, player_id) VALUES (?, ?)")
            .bind(group_id.to_string())
            .bind(player_id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to add group member")?;
        Ok(())
    }

    pub async fn remove_member(&self, group_id: GroupId, player_id: PlayerId) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM group_members WHERE group_id = ? AND player_id = ?")
                .bind(group_id.to_string())
                .bind(player_id.to_string())
                .execute(self.connection.pool())
                .await
                .context("Failed to remove group member")?;
        Ok(result.rows_affected() > 0)
    }

    /// Groups a player belongs to
    pub async fn groups_of(&self, player_id: PlayerId) -> Result<Vec<PlayerGroup>> {
        let rows: Vec<GroupRow> = sqlx::query_as(
            "SELECT g.id, g.name, g.class_rank, g.parent_id, g.points FROM player_groups g \
             JOIN group_members m ON m.group_id = g.id \
             WHERE m.player_id = ? ORDER BY g.class_rank, g.name",
        )
        .bind(player_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list groups of player")?;

        rows.into_iter().map(row_to_group).collect()
    }

    /// The member group with the lowest class rank, if any
    pub async fn proximate_of(&self, player_id: PlayerId) -> Result<Option<PlayerGroup>> {
        let row: Option<GroupRow> = sqlx::query_as(
            "SELECT g.id, g.name, g.class_rank, g.parent_id, g.points FROM player_groups g \
             JOIN group_members m ON m.group_id = g.id \
             WHERE m.player_id = ? ORDER BY g.class_rank LIMIT 1",
        )
        .bind(player_id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch proximate group")?;

        row.map(row_to_group).transpose()
    }

    /// Sum of member players' points, zero when the group is empty
    pub async fn live_points(&self, group_id: GroupId) -> Result<f64> {
        let (total,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(p.points), 0.0) FROM players p \
             JOIN group_members m ON m.player_id = p.id \
             WHERE m.group_id = ?",
        )
        .bind(group_id.to_string())
        .fetch_one(self.connection.pool())
        .await
        .context("Failed to sum group points")?;
        Ok(total)
    }
}

fn row_to_group(row: GroupRow) -> Result<PlayerGroup> {
    let (id, name, class_rank, parent_id, points) = row;
    Ok(PlayerGroup {
        id: GroupId::from(parse_uuid(&id)?),
        name,
        class_rank,
        parent_id: parent_id
            .map(|parent| Ok::<_, anyhow::Error>(GroupId::from(parse_uuid(&parent)?)))
            .transpose()?,
        points,
    })
}
