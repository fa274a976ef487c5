//! Standard rules oracle
//!
//! Default implementation of the [`RulesOracle`] port: level badges are
//! artifacts named `level-{n}`, level thresholds come from a fixed table,
//! and the `dispel` spell clears the target's other active effects right
//! after it lands.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::outbound::RulesOracle;
use crate::domain::entities::{Artifact, Player, SpellDue};
use crate::domain::value_objects::LevelProgress;
use crate::infrastructure::persistence::SqliteRepository;

/// Total points required to reach level 2, 3, ... in order. Level 1 is
/// the starting level; the table's last entry is the cap.
const LEVEL_LIMITS: &[f64] = &[80.0, 125.0, 180.0, 245.0, 440.0, 658.0, 1500.0];

/// Spell that wipes the target's other active effects when cast
const DISPEL: &str = "dispel";

pub struct StandardRules {
    repository: SqliteRepository,
}

impl StandardRules {
    pub fn new(repository: SqliteRepository) -> Self {
        Self { repository }
    }

    fn max_level() -> i64 {
        LEVEL_LIMITS.len() as i64 + 1
    }

    /// Total points at which `level_no` begins
    fn threshold(level_no: i64) -> f64 {
        if level_no <= 1 {
            0.0
        } else {
            let index = (level_no - 2) as usize;
            LEVEL_LIMITS[index.min(LEVEL_LIMITS.len() - 1)]
        }
    }
}

#[async_trait]
impl RulesOracle for StandardRules {
    async fn user_level(&self, level_no: i64, _player: &Player) -> Result<Option<Artifact>> {
        let name = format!("level-{}", level_no);
        self.repository.magic().get_artifact_by_name(&name).await
    }

    async fn level_progress(&self, player: &Player) -> Result<LevelProgress> {
        let level_no = player.level_no.max(1);
        if level_no >= Self::max_level() {
            return Ok(LevelProgress::capped(level_no));
        }

        let points = player.points_or_zero();
        let base = Self::threshold(level_no);
        let next = Self::threshold(level_no + 1);
        let span = next - base;

        let points_gained = (points - base).max(0.0);
        let points_left = (next - points).max(0.0);
        let percent = if span > 0.0 {
            (points_gained / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Ok(LevelProgress {
            points_gained,
            points_left,
            next_level: level_no + 1,
            percent,
        })
    }

    async fn artifact_for_modifier(
        &self,
        name: &str,
        _player: &Player,
    ) -> Result<Option<Artifact>> {
        self.repository.magic().get_artifact_by_name(name).await
    }

    async fn post_cast(&self, due: &SpellDue) -> Result<()> {
        if due.spell_name == DISPEL {
            let magic = self.repository.magic();
            let cleared = magic.delete_other_dues(due.player_id, due.id).await?;
            // The dispel itself is spent in the act, not left as an effect
            magic.delete_due(due.id).await?;
            debug!(player_id = %due.player_id, cleared, "Dispel cleared active effects");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::AccountId;

    fn player_with(points: f64, level_no: i64) -> Player {
        let mut player = Player::new(AccountId::new());
        player.points = Some(points);
        player.level_no = level_no;
        player
    }

    #[tokio::test]
    async fn progress_tracks_the_threshold_table() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let rules = StandardRules::new(repository);

        let progress = rules.level_progress(&player_with(40.0, 1)).await.unwrap();
        assert_eq!(progress.next_level, 2);
        assert_eq!(progress.points_gained, 40.0);
        assert_eq!(progress.points_left, 40.0);
        assert!((progress.percent - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn progress_is_capped_at_the_top_level() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let rules = StandardRules::new(repository);

        let top = StandardRules::max_level();
        let progress = rules
            .level_progress(&player_with(10_000.0, top))
            .await
            .unwrap();
        assert_eq!(progress.next_level, top);
        assert_eq!(progress.points_left, 0.0);
        assert_eq!(progress.percent, 1.0);
    }

    #[tokio::test]
    async fn user_level_resolves_the_level_artifact() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let badge = Artifact::new("level-3", "Level 3");
        repository.magic().create_artifact(&badge).await.unwrap();
        let rules = StandardRules::new(repository);

        let artifact = rules
            .user_level(3, &player_with(0.0, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.name, "level-3");
        assert!(rules
            .user_level(4, &player_with(0.0, 4))
            .await
            .unwrap()
            .is_none());
    }
}
