//! Scoring Service - the only sanctioned path for mutating points
//!
//! Every scoring event is appended to the ledger; `points` entries are
//! additionally folded into the cached value on the player row, which the
//! ladder sorts on.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::entities::{HistoryEntry, Player};
use crate::domain::value_objects::PlayerId;
use crate::infrastructure::persistence::SqliteRepository;

/// Coin name whose ledger total is mirrored on the player row
pub const POINTS_COIN: &str = "points";

pub struct ScoringService {
    repository: SqliteRepository,
}

impl ScoringService {
    pub fn new(repository: SqliteRepository) -> Self {
        Self { repository }
    }

    /// Record a scoring event for a player and return the updated player
    #[instrument(skip(self))]
    pub async fn score(
        &self,
        player_id: PlayerId,
        coin: &str,
        amount: f64,
    ) -> Result<Player> {
        let mut player = self
            .repository
            .players()
            .get(player_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Player not found: {}", player_id))?;

        let entry = HistoryEntry::new(player_id, coin, amount);
        self.repository
            .scoring()
            .append(&entry)
            .await
            .context("Failed to append scoring entry")?;

        if coin == POINTS_COIN {
            player.points = Some(player.points_or_zero() + amount);
            self.repository
                .players()
                .update(&player)
                .await
                .context("Failed to update cached player points")?;
        }

        info!(player_id = %player_id, coin, amount, "Scored");
        Ok(player)
    }

    /// Per-coin ledger totals for a player
    #[instrument(skip(self))]
    pub async fn user_coins(&self, player_id: PlayerId) -> Result<Vec<(String, f64)>> {
        self.repository
            .scoring()
            .user_coins(player_id)
            .await
            .context("Failed to sum player coins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;

    async fn seed_player(repository: &SqliteRepository) -> Player {
        let account = Account::new("ada");
        repository.accounts().create(&account).await.unwrap();
        let player = Player::new(account.id);
        repository.players().create(&player).await.unwrap();
        player
    }

    #[tokio::test]
    async fn scoring_points_updates_the_cached_value() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = ScoringService::new(repository.clone());
        let player = seed_player(&repository).await;

        service.score(player.id, POINTS_COIN, 12.5).await.unwrap();
        let updated = service.score(player.id, POINTS_COIN, 2.5).await.unwrap();
        assert_eq!(updated.points, Some(15.0));
    }

    #[tokio::test]
    async fn other_coins_only_touch_the_ledger() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = ScoringService::new(repository.clone());
        let player = seed_player(&repository).await;

        service.score(player.id, "gold", 7.0).await.unwrap();
        service.score(player.id, "gold", 3.0).await.unwrap();

        let unchanged = repository.players().get(player.id).await.unwrap().unwrap();
        assert_eq!(unchanged.points, Some(0.0));

        let coins = service.user_coins(player.id).await.unwrap();
        assert_eq!(coins, vec![("gold".to_string(), 10.0)]);
    }
}
