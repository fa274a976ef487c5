//! Rules oracle port
//!
//! The oracle owns game-rule decisions the player aggregate delegates:
//! which artifact represents a level, how far a player is from the next
//! one, which artifact backs a named modifier, and what happens right
//! after a spell lands.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{Artifact, Player, SpellDue};
use crate::domain::value_objects::LevelProgress;

#[async_trait]
pub trait RulesOracle: Send + Sync {
    /// The artifact representing `level_no`. Receives the player so
    /// implementations can tailor the artifact per player.
    async fn user_level(&self, level_no: i64, player: &Player) -> Result<Option<Artifact>>;

    /// Progress of the player towards the next level
    async fn level_progress(&self, player: &Player) -> Result<LevelProgress>;

    /// The artifact backing a named modifier, used when a grant creates
    /// the first holding
    async fn artifact_for_modifier(&self, name: &str, player: &Player)
        -> Result<Option<Artifact>>;

    /// Hook invoked after a spell effect is recorded, for spells with
    /// immediate side effects (e.g. dispel)
    async fn post_cast(&self, due: &SpellDue) -> Result<()>;
}
