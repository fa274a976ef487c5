//! Player Service - modifier accounting and player aggregate queries
//!
//! This service implements the give/use bookkeeping for artifact holdings,
//! spell collection and casting, and the delegated aggregate lookups
//! (level, proximate group, coins, extensions).

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::RulesOracle;
use crate::domain::entities::{
    ActiveModifier, Artifact, ArtifactHolding, Player, PlayerExtension, PlayerGroup, SpellDue,
    SpellHolding,
};
use crate::domain::value_objects::{
    DueId, HoldingId, LevelProgress, PlayerId, SpellId,
};
use crate::infrastructure::persistence::SqliteRepository;

/// Failures of modifier accounting. Missing holdings on withdrawal count
/// as a held amount of zero rather than a distinct error.
#[derive(Debug, thiserror::Error)]
pub enum ModifierError {
    #[error("insufficient amount: requested {requested}, held {held}")]
    Insufficient { requested: i64, held: i64 },

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown spell: {0}")]
    UnknownSpell(SpellId),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Player service trait defining the aggregate's use cases
#[async_trait]
pub trait PlayerService: Send + Sync {
    /// Get a player by id
    async fn get(&self, id: PlayerId) -> Result<Option<Player>>;

    /// The modifier currently affecting the player under `name`: an
    /// artifact holding first, an active spell effect second.
    async fn has_modifier(&self, id: PlayerId, name: &str) -> Result<Option<ActiveModifier>>;

    /// Withdraw `amount` of an artifact modifier. Deletes the holding when
    /// it reaches exactly zero, returning `None`; returns the surviving
    /// holding otherwise. Non-positive amounts leave the holding untouched.
    async fn use_modifier(
        &self,
        id: PlayerId,
        name: &str,
        amount: i64,
    ) -> Result<Option<ArtifactHolding>, ModifierError>;

    /// Grant `amount` of an artifact modifier. Non-positive amounts are a
    /// no-op returning `None`.
    async fn give_modifier(
        &self,
        id: PlayerId,
        name: &str,
        amount: i64,
    ) -> Result<Option<ArtifactHolding>, ModifierError>;

    /// Add one of `spell` to the player's collection
    async fn add_spell(&self, id: PlayerId, spell_id: SpellId)
        -> Result<SpellHolding, ModifierError>;

    /// Cast `spell` from `source` onto `target` until `due` (the spell's
    /// default duration when `None`). Returns `Ok(false)` when the source
    /// has no stock or the target already carries the spell.
    async fn cast_spell(
        &self,
        target: PlayerId,
        spell_id: SpellId,
        source: PlayerId,
        due: Option<DateTime<Utc>>,
    ) -> Result<bool, ModifierError>;

    /// Spells actively affecting the player
    async fn active_spells(&self, id: PlayerId) -> Result<Vec<SpellDue>>;

    /// The artifact for the player's current level, via the rules oracle
    async fn level(&self, id: PlayerId) -> Result<Option<Artifact>>;

    /// Progress towards the next level, via the rules oracle
    async fn level_progress(&self, id: PlayerId) -> Result<LevelProgress>;

    /// The member group with the lowest class rank, or `None`
    async fn proximate_group(&self, id: PlayerId) -> Result<Option<PlayerGroup>>;

    /// Per-coin ledger totals
    async fn coins(&self, id: PlayerId) -> Result<Vec<(String, f64)>>;

    /// The typed extension of the player for `kind`, created on first use
    async fn extension(&self, id: PlayerId, kind: &str) -> Result<PlayerExtension>;
}

/// Default implementation of PlayerService over the SQLite repository
pub struct PlayerServiceImpl {
    repository: SqliteRepository,
    oracle: Arc<dyn RulesOracle>,
}

impl PlayerServiceImpl {
    pub fn new(repository: SqliteRepository, oracle: Arc<dyn RulesOracle>) -> Self {
        Self { repository, oracle }
    }

    async fn require_player(&self, id: PlayerId) -> Result<Player, ModifierError> {
        self.repository
            .players()
            .get(id)
            .await?
            .ok_or(ModifierError::UnknownPlayer(id))
    }
}

#[async_trait]
impl PlayerService for PlayerServiceImpl {
    #[instrument(skip(self))]
    async fn get(&self, id: PlayerId) -> Result<Option<Player>> {
        self.repository
            .players()
            .get(id)
            .await
            .context("Failed to get player from repository")
    }

    #[instrument(skip(self))]
    async fn has_modifier(&self, id: PlayerId, name: &str) -> Result<Option<ActiveModifier>> {
        if let Some(holding) = self.repository.magic().artifact_holding(id, name).await? {
            return Ok(Some(ActiveModifier::Artifact(holding)));
        }
        if let Some(due) = self.repository.magic().spell_due(id, name).await? {
            return Ok(Some(ActiveModifier::SpellDue(due)));
        }
        Ok(None)
    }

    #[instrument(skip(self), fields(player_id = %id))]
    async fn use_modifier(
        &self,
        id: PlayerId,
        name: &str,
        amount: i64,
    ) -> Result<Option<ArtifactHolding>, ModifierError> {
        let magic = self.repository.magic();

        let holding = match magic.artifact_holding(id, name).await? {
            Some(holding) => holding,
            None => {
                return Err(ModifierError::Insufficient {
                    requested: amount,
                    held: 0,
                })
            }
        };

        // A withdrawal of nothing must not touch the row
        if amount <= 0 {
            return Ok(Some(holding));
        }

        if !magic.try_withdraw_artifact(holding.id, amount).await? {
            // The guard refused; re-read the row for the error detail
            let held = magic
                .artifact_holding(id, name)
                .await?
                .map(|h| h.amount)
                .unwrap_or(0);
            return Err(ModifierError::Insufficient {
                requested: amount,
                held,
            });
        }

        if magic.delete_artifact_holding_if_empty(holding.id).await? {
            debug!(player_id = %id, modifier = name, "Holding exhausted and removed");
            return Ok(None);
        }

        Ok(magic.artifact_holding(id, name).await?)
    }

    #[instrument(skip(self), fields(player_id = %id))]
    async fn give_modifier(
        &self,
        id: PlayerId,
        name: &str,
        amount: i64,
    ) -> Result<Option<ArtifactHolding>, ModifierError> {
        if amount <= 0 {
            return Ok(None);
        }

        let magic = self.repository.magic();

        if let Some(holding) = magic.artifact_holding(id, name).await? {
            magic.increment_artifact_holding(holding.id, amount).await?;
            return Ok(magic.artifact_holding(id, name).await?);
        }

        let player = self.require_player(id).await?;
        let artifact = self
            .oracle
            .artifact_for_modifier(name, &player)
            .await?
            .ok_or_else(|| ModifierError::UnknownModifier(name.to_string()))?;

        let holding = ArtifactHolding {
            id: HoldingId::new(),
            player_id: id,
            artifact_id: artifact.id,
            artifact_name: artifact.name,
            amount,
        };
        magic.insert_artifact_holding(&holding).await?;

        info!(player_id = %id, modifier = name, amount, "Granted new modifier holding");
        Ok(Some(holding))
    }

    #[instrument(skip(self), fields(player_id = %id, spell_id = %spell_id))]
    async fn add_spell(
        &self,
        id: PlayerId,
        spell_id: SpellId,
    ) -> Result<SpellHolding, ModifierError> {
        let magic = self.repository.magic();

        let spell = magic
            .get_spell(spell_id)
            .await?
            .ok_or(ModifierError::UnknownSpell(spell_id))?;

        if let Some(holding) = magic.spell_holding(id, spell_id).await? {
            magic.increment_spell_holding(holding.id, 1).await?;
            let refreshed = magic
                .spell_holding(id, spell_id)
                .await?
                .context("Spell holding vanished while incrementing")?;
            return Ok(refreshed);
        }

        let holding = SpellHolding {
            id: HoldingId::new(),
            player_id: id,
            spell_id,
            spell_name: spell.name,
            amount: 1,
        };
        magic.insert_spell_holding(&holding).await?;
        Ok(holding)
    }

    #[instrument(skip(self), fields(target = %target, source = %source, spell_id = %spell_id))]
    async fn cast_spell(
        &self,
        target: PlayerId,
        spell_id: SpellId,
        source: PlayerId,
        due: Option<DateTime<Utc>>,
    ) -> Result<bool, ModifierError> {
        let magic = self.repository.magic();

        let spell = magic
            .get_spell(spell_id)
            .await?
            .ok_or(ModifierError::UnknownSpell(spell_id))?;
        self.require_player(target).await?;

        // The caster must hold at least one of the spell
        let stock = match magic.spell_holding(source, spell_id).await? {
            Some(stock) => stock,
            None => return Ok(false),
        };

        let record = SpellDue {
            id: DueId::new(),
            player_id: target,
            spell_id,
            spell_name: spell.name.clone(),
            source_id: source,
            due: due.unwrap_or_else(|| spell.default_due()),
        };

        if !magic.insert_spell_due(&record).await? {
            debug!(target = %target, spell = %spell.name, "Target already under this spell");
            return Ok(false);
        }

        self.oracle.post_cast(&record).await?;

        if !magic.try_withdraw_spell(stock.id, 1).await? {
            // A concurrent cast spent the last stock; take the effect back
            warn!(source = %source, spell = %spell.name, "Stock spent during cast, rolling back effect");
            magic.delete_due(record.id).await?;
            return Ok(false);
        }
        magic.delete_spell_holding_if_empty(stock.id).await?;

        info!(target = %target, source = %source, spell = %spell.name, due = %record.due, "Spell cast");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn active_spells(&self, id: PlayerId) -> Result<Vec<SpellDue>> {
        let dues = self
            .repository
            .magic()
            .dues_on(id)
            .await
            .context("Failed to list active spells")?;

        // Effects past due may linger until the sweep worker runs; they
        // are not active any more
        let now = Utc::now();
        Ok(dues.into_iter().filter(|due| !due.is_expired(now)).collect())
    }

    #[instrument(skip(self))]
    async fn level(&self, id: PlayerId) -> Result<Option<Artifact>> {
        let player = match self.repository.players().get(id).await? {
            Some(player) => player,
            None => return Ok(None),
        };
        self.oracle.user_level(player.level_no, &player).await
    }

    #[instrument(skip(self))]
    async fn level_progress(&self, id: PlayerId) -> Result<LevelProgress> {
        let player = self
            .repository
            .players()
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Player not found: {}", id))?;
        self.oracle.level_progress(&player).await
    }

    #[instrument(skip(self))]
    async fn proximate_group(&self, id: PlayerId) -> Result<Option<PlayerGroup>> {
        self.repository
            .groups()
            .proximate_of(id)
            .await
            .context("Failed to resolve proximate group")
    }

    #[instrument(skip(self))]
    async fn coins(&self, id: PlayerId) -> Result<Vec<(String, f64)>> {
        self.repository
            .scoring()
            .user_coins(id)
            .await
            .context("Failed to sum player coins")
    }

    #[instrument(skip(self), fields(player_id = %id))]
    async fn extension(&self, id: PlayerId, kind: &str) -> Result<PlayerExtension> {
        if let Some(extension) = self.repository.players().get_extension(id, kind).await? {
            return Ok(extension);
        }

        let extension = PlayerExtension::new(id, kind);
        self.repository
            .players()
            .insert_extension(&extension)
            .await
            .context("Failed to create player extension")?;
        debug!(player_id = %id, kind, "Created player extension");
        Ok(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::StandardRules;
    use crate::domain::entities::{Account, Artifact, Spell};

    async fn service() -> (SqliteRepository, PlayerServiceImpl) {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let oracle = Arc::new(StandardRules::new(repository.clone()));
        let service = PlayerServiceImpl::new(repository.clone(), oracle);
        (repository, service)
    }

    async fn seed_player(repository: &SqliteRepository, username: &str) -> Player {
        let account = Account::new(username);
        repository.accounts().create(&account).await.unwrap();
        let player = Player::new(account.id);
        repository.players().create(&player).await.unwrap();
        player
    }

    async fn seed_artifact(repository: &SqliteRepository, name: &str) -> Artifact {
        let artifact = Artifact::new(name, name);
        repository.magic().create_artifact(&artifact).await.unwrap();
        artifact
    }

    async fn seed_spell(repository: &SqliteRepository, name: &str) -> Spell {
        let spell = Spell::new(name, name);
        repository.magic().create_spell(&spell).await.unwrap();
        spell
    }

    #[tokio::test]
    async fn give_then_use_nets_to_zero_and_deletes() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        service.give_modifier(player.id, "shield", 2).await.unwrap();
        let left = service.use_modifier(player.id, "shield", 2).await.unwrap();
        assert!(left.is_none());
        assert!(service
            .has_modifier(player.id, "shield")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn use_more_than_held_fails_and_leaves_state() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        service.give_modifier(player.id, "shield", 1).await.unwrap();
        let err = service
            .use_modifier(player.id, "shield", 5)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModifierError::Insufficient {
                requested: 5,
                held: 1
            }
        ));

        match service.has_modifier(player.id, "shield").await.unwrap() {
            Some(ActiveModifier::Artifact(holding)) => assert_eq!(holding.amount, 1),
            other => panic!("expected artifact holding, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn use_without_holding_reports_zero_held() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        let err = service
            .use_modifier(player.id, "shield", 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModifierError::Insufficient {
                requested: 1,
                held: 0
            }
        ));
    }

    #[tokio::test]
    async fn non_positive_grant_is_a_noop() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        assert!(service
            .give_modifier(player.id, "shield", 0)
            .await
            .unwrap()
            .is_none());
        assert!(service
            .give_modifier(player.id, "shield", -4)
            .await
            .unwrap()
            .is_none());
        assert!(service
            .has_modifier(player.id, "shield")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn grant_for_unknown_modifier_is_refused() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;

        let err = service
            .give_modifier(player.id, "no-such-thing", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ModifierError::UnknownModifier(_)));
    }

    #[tokio::test]
    async fn repeated_grants_accumulate() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        service.give_modifier(player.id, "shield", 3).await.unwrap();
        let holding = service
            .give_modifier(player.id, "shield", 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holding.amount, 5);
    }

    #[tokio::test]
    async fn shield_walkthrough() {
        // Grant 3; use 2 leaves 1; using 2 again fails; use 1 deletes.
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        seed_artifact(&repository, "shield").await;

        service.give_modifier(player.id, "shield", 3).await.unwrap();

        let left = service
            .use_modifier(player.id, "shield", 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(left.amount, 1);

        let err = service
            .use_modifier(player.id, "shield", 2)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModifierError::Insufficient {
                requested: 2,
                held: 1
            }
        ));

        assert!(service
            .use_modifier(player.id, "shield", 1)
            .await
            .unwrap()
            .is_none());
        assert!(service
            .has_modifier(player.id, "shield")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn add_spell_creates_then_increments() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        let spell = seed_spell(&repository, "curse").await;

        let holding = service.add_spell(player.id, spell.id).await.unwrap();
        assert_eq!(holding.amount, 1);
        let holding = service.add_spell(player.id, spell.id).await.unwrap();
        assert_eq!(holding.amount, 2);
    }

    #[tokio::test]
    async fn cast_without_stock_returns_false() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        let spell = seed_spell(&repository, "curse").await;

        let cast = service
            .cast_spell(target.id, spell.id, source.id, None)
            .await
            .unwrap();
        assert!(!cast);
        assert!(service.active_spells(target.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_cast_moves_one_stock_into_one_effect() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        let spell = seed_spell(&repository, "curse").await;
        let due = Utc::now() + chrono::Duration::days(2);

        service.add_spell(source.id, spell.id).await.unwrap();
        service.add_spell(source.id, spell.id).await.unwrap();

        let cast = service
            .cast_spell(target.id, spell.id, source.id, Some(due))
            .await
            .unwrap();
        assert!(cast);

        let dues = service.active_spells(target.id).await.unwrap();
        assert_eq!(dues.len(), 1);
        assert_eq!(dues[0].due, due);
        assert_eq!(dues[0].source_id, source.id);

        let stock = repository
            .magic()
            .spell_holding(source.id, spell.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stock.amount, 1);
    }

    #[tokio::test]
    async fn casting_last_stock_deletes_the_holding() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        let spell = seed_spell(&repository, "curse").await;

        service.add_spell(source.id, spell.id).await.unwrap();
        assert!(service
            .cast_spell(target.id, spell.id, source.id, None)
            .await
            .unwrap());
        assert!(repository
            .magic()
            .spell_holding(source.id, spell.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn recasting_on_an_affected_target_returns_false() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        let spell = seed_spell(&repository, "curse").await;

        service.add_spell(source.id, spell.id).await.unwrap();
        service.add_spell(source.id, spell.id).await.unwrap();

        assert!(service
            .cast_spell(target.id, spell.id, source.id, None)
            .await
            .unwrap());
        assert!(!service
            .cast_spell(target.id, spell.id, source.id, None)
            .await
            .unwrap());

        // The refused cast must not consume stock
        let stock = repository
            .magic()
            .spell_holding(source.id, spell.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stock.amount, 1);
    }

    #[tokio::test]
    async fn has_modifier_prefers_artifact_over_active_spell() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        seed_artifact(&repository, "haze").await;
        let spell = seed_spell(&repository, "haze").await;

        service.add_spell(source.id, spell.id).await.unwrap();
        assert!(service
            .cast_spell(target.id, spell.id, source.id, None)
            .await
            .unwrap());
        service.give_modifier(target.id, "haze", 1).await.unwrap();

        match service.has_modifier(target.id, "haze").await.unwrap() {
            Some(ActiveModifier::Artifact(_)) => {}
            other => panic!("expected artifact precedence, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn proximate_group_is_the_most_senior_membership() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;
        assert!(service.proximate_group(player.id).await.unwrap().is_none());

        let junior = crate::domain::entities::PlayerGroup::new("Juniors", 5);
        let senior = crate::domain::entities::PlayerGroup::new("Seniors", 2);
        repository.groups().create(&junior).await.unwrap();
        repository.groups().create(&senior).await.unwrap();
        repository.groups().add_member(junior.id, player.id).await.unwrap();
        repository.groups().add_member(senior.id, player.id).await.unwrap();

        let proximate = service.proximate_group(player.id).await.unwrap().unwrap();
        assert_eq!(proximate.id, senior.id);
    }

    #[tokio::test]
    async fn dispel_clears_other_active_effects() {
        let (repository, service) = service().await;
        let source = seed_player(&repository, "ada").await;
        let target = seed_player(&repository, "grace").await;
        let curse = seed_spell(&repository, "curse").await;
        let dispel = seed_spell(&repository, "dispel").await;

        service.add_spell(source.id, curse.id).await.unwrap();
        service.add_spell(target.id, dispel.id).await.unwrap();

        assert!(service
            .cast_spell(target.id, curse.id, source.id, None)
            .await
            .unwrap());
        assert_eq!(service.active_spells(target.id).await.unwrap().len(), 1);

        // Casting dispel on yourself wipes the board clean
        assert!(service
            .cast_spell(target.id, dispel.id, target.id, None)
            .await
            .unwrap());
        assert!(service.active_spells(target.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn extension_is_created_once_and_reused() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada").await;

        let first = service.extension(player.id, "qotd").await.unwrap();
        let second = service.extension(player.id, "qotd").await.unwrap();
        assert_eq!(first.id, second.id);

        let other = service.extension(player.id, "challenge").await.unwrap();
        assert_ne!(first.id, other.id);
    }
}
