//! Group Service - hierarchy queries over player groups
//!
//! Sister lookups are recomputed on every call; there is deliberately no
//! per-instance cache, so hierarchy edits are visible immediately.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::entities::PlayerGroup;
use crate::domain::value_objects::{GroupId, PlayerId};
use crate::infrastructure::persistence::SqliteRepository;

/// Request to create a new player group
#[derive(Debug, Clone)]
pub struct CreateGroupRequest {
    pub name: String,
    pub class_rank: i64,
    pub parent_id: Option<GroupId>,
}

pub struct GroupService {
    repository: SqliteRepository,
}

impl GroupService {
    pub fn new(repository: SqliteRepository) -> Self {
        Self { repository }
    }

    fn validate_create_request(request: &CreateGroupRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            anyhow::bail!("Group name cannot be empty");
        }
        if request.name.len() > 100 {
            anyhow::bail!("Group name cannot exceed 100 characters");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(name = %request.name))]
    pub async fn create_group(&self, request: CreateGroupRequest) -> Result<PlayerGroup> {
        Self::validate_create_request(&request)?;

        let mut group = PlayerGroup::new(&request.name, request.class_rank);
        if let Some(parent_id) = request.parent_id {
            let _ = self
                .repository
                .groups()
                .get(parent_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Parent group not found: {}", parent_id))?;
            group = group.with_parent(parent_id);
        }

        self.repository
            .groups()
            .create(&group)
            .await
            .context("Failed to create group in repository")?;

        info!(group_id = %group.id, class_rank = group.class_rank, "Created group: {}", group.name);
        Ok(group)
    }

    #[instrument(skip(self))]
    pub async fn get_group(&self, id: GroupId) -> Result<Option<PlayerGroup>> {
        self.repository
            .groups()
            .get(id)
            .await
            .context("Failed to get group from repository")
    }

    #[instrument(skip(self))]
    pub async fn list_groups(&self) -> Result<Vec<PlayerGroup>> {
        self.repository
            .groups()
            .list()
            .await
            .context("Failed to list groups from repository")
    }

    /// Direct subgroups of a group
    #[instrument(skip(self))]
    pub async fn children(&self, id: GroupId) -> Result<Vec<PlayerGroup>> {
        self.repository
            .groups()
            .children(id)
            .await
            .context("Failed to list child groups")
    }

    /// Groups sharing this group's parent, or - for a root group - the
    /// other root groups of the same class rank. Excludes the group
    /// itself. Recomputed on every call.
    #[instrument(skip(self))]
    pub async fn sisters(&self, id: GroupId) -> Result<Vec<PlayerGroup>> {
        let group = self
            .repository
            .groups()
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Group not found: {}", id))?;

        match group.parent_id {
            Some(parent_id) => self
                .repository
                .groups()
                .siblings_under(parent_id, group.id)
                .await
                .context("Failed to list sibling groups"),
            None => self
                .repository
                .groups()
                .roots_with_rank(group.class_rank, group.id)
                .await
                .context("Failed to list peer root groups"),
        }
    }

    /// Sum of member players' points, zero for an empty group
    #[instrument(skip(self))]
    pub async fn live_points(&self, id: GroupId) -> Result<f64> {
        self.repository
            .groups()
            .live_points(id)
            .await
            .context("Failed to sum group points")
    }

    #[instrument(skip(self))]
    pub async fn add_member(&self, group_id: GroupId, player_id: PlayerId) -> Result<()> {
        let _ = self
            .repository
            .groups()
            .get(group_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Group not found: {}", group_id))?;
        let _ = self
            .repository
            .players()
            .get(player_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Player not found: {}", player_id))?;

        self.repository
            .groups()
            .add_member(group_id, player_id)
            .await
            .context("Failed to add group member")?;

        info!(group_id = %group_id, player_id = %player_id, "Added player to group");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_member(&self, group_id: GroupId, player_id: PlayerId) -> Result<bool> {
        self.repository
            .groups()
            .remove_member(group_id, player_id)
            .await
            .context("Failed to remove group member")
    }

    /// Recompute the cached points column from member points. The cache
    /// only feeds sorting and standings pages; lookups that need the live
    /// value go through [`Self::live_points`].
    #[instrument(skip(self))]
    pub async fn refresh_cached_points(&self, id: GroupId) -> Result<PlayerGroup> {
        let mut group = self
            .repository
            .groups()
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Group not found: {}", id))?;

        group.points = self.repository.groups().live_points(id).await?;
        self.repository
            .groups()
            .update(&group)
            .await
            .context("Failed to store cached group points")?;
        Ok(group)
    }

    /// Groups a player belongs to, most senior class rank first
    #[instrument(skip(self))]
    pub async fn groups_of(&self, player_id: PlayerId) -> Result<Vec<PlayerGroup>> {
        self.repository
            .groups()
            .groups_of(player_id)
            .await
            .context("Failed to list groups of player")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, Player};

    async fn service() -> (SqliteRepository, GroupService) {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = GroupService::new(repository.clone());
        (repository, service)
    }

    async fn seed_player(repository: &SqliteRepository, username: &str, points: f64) -> Player {
        let account = Account::new(username);
        repository.accounts().create(&account).await.unwrap();
        let mut player = Player::new(account.id);
        player.points = Some(points);
        repository.players().create(&player).await.unwrap();
        player
    }

    fn create(name: &str, class_rank: i64, parent_id: Option<GroupId>) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            class_rank,
            parent_id,
        }
    }

    #[tokio::test]
    async fn create_request_validation() {
        assert!(GroupService::validate_create_request(&create("", 0, None)).is_err());
        assert!(GroupService::validate_create_request(&create("Wizards", 0, None)).is_ok());
    }

    #[tokio::test]
    async fn sisters_of_root_share_class_rank_and_exclude_self() {
        let (_repository, service) = service().await;
        let year = service.create_group(create("Year 2", 2, None)).await.unwrap();
        let peer_a = service.create_group(create("Year 2 B", 2, None)).await.unwrap();
        let peer_b = service.create_group(create("Year 2 C", 2, None)).await.unwrap();
        let _other_rank = service.create_group(create("Year 1", 1, None)).await.unwrap();

        let sisters = service.sisters(year.id).await.unwrap();
        let ids: Vec<GroupId> = sisters.iter().map(|g| g.id).collect();
        assert_eq!(sisters.len(), 2);
        assert!(ids.contains(&peer_a.id));
        assert!(ids.contains(&peer_b.id));
        assert!(!ids.contains(&year.id));
    }

    #[tokio::test]
    async fn sisters_under_a_parent_are_its_other_children() {
        let (_repository, service) = service().await;
        let faculty = service.create_group(create("Faculty", 0, None)).await.unwrap();
        let a = service
            .create_group(create("Section A", 1, Some(faculty.id)))
            .await
            .unwrap();
        let b = service
            .create_group(create("Section B", 1, Some(faculty.id)))
            .await
            .unwrap();

        let sisters = service.sisters(a.id).await.unwrap();
        assert_eq!(sisters.len(), 1);
        assert_eq!(sisters[0].id, b.id);
    }

    #[tokio::test]
    async fn sisters_are_recomputed_after_hierarchy_changes() {
        let (_repository, service) = service().await;
        let group = service.create_group(create("Year 3", 3, None)).await.unwrap();
        assert!(service.sisters(group.id).await.unwrap().is_empty());

        let late_peer = service.create_group(create("Year 3 B", 3, None)).await.unwrap();
        let sisters = service.sisters(group.id).await.unwrap();
        assert_eq!(sisters.len(), 1);
        assert_eq!(sisters[0].id, late_peer.id);
    }

    #[tokio::test]
    async fn live_points_sums_members_and_defaults_to_zero() {
        let (repository, service) = service().await;
        let group = service.create_group(create("Scorers", 0, None)).await.unwrap();
        assert_eq!(service.live_points(group.id).await.unwrap(), 0.0);

        let ada = seed_player(&repository, "ada", 10.5).await;
        let grace = seed_player(&repository, "grace", 4.5).await;
        service.add_member(group.id, ada.id).await.unwrap();
        service.add_member(group.id, grace.id).await.unwrap();

        assert_eq!(service.live_points(group.id).await.unwrap(), 15.0);
    }

    #[tokio::test]
    async fn cached_points_follow_a_refresh() {
        let (repository, service) = service().await;
        let group = service.create_group(create("Scorers", 0, None)).await.unwrap();
        let ada = seed_player(&repository, "ada", 30.0).await;
        service.add_member(group.id, ada.id).await.unwrap();

        let refreshed = service.refresh_cached_points(group.id).await.unwrap();
        assert_eq!(refreshed.points, 30.0);

        let stored = service.get_group(group.id).await.unwrap().unwrap();
        assert_eq!(stored.points, 30.0);
    }

    #[tokio::test]
    async fn children_lists_direct_subgroups() {
        let (_repository, service) = service().await;
        let parent = service.create_group(create("Guild", 0, None)).await.unwrap();
        let child = service
            .create_group(create("Chapter", 1, Some(parent.id)))
            .await
            .unwrap();
        let _unrelated = service.create_group(create("Other", 0, None)).await.unwrap();

        let children = service.children(parent.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }
}
