//! Magic entities - artifacts, spells, and the records tying them to players

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{
    ArtifactId, DueId, HoldingId, PlayerId, SpellId,
};

/// A collectible modifier with a name-keyed effect. Level badges are
/// artifacts too, named `level-{n}`.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: ArtifactId,
    /// Unique lookup key, e.g. `shield` or `level-3`
    pub name: String,
    pub title: String,
    pub description: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            name: name.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A collectible spell. Once cast it applies a time-limited effect on a
/// target player.
#[derive(Debug, Clone)]
pub struct Spell {
    pub id: SpellId,
    /// Unique lookup key, e.g. `curse` or `dispel`
    pub name: String,
    pub title: String,
    pub description: String,
    /// Price in coins
    pub price: f64,
    /// Default effect duration in days, used when the caller does not
    /// supply an explicit due timestamp
    pub due_days: i64,
}

impl Spell {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: SpellId::new(),
            name: name.into(),
            title: title.into(),
            description: String::new(),
            price: 0.0,
            due_days: 3,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_due_days(mut self, due_days: i64) -> Self {
        self.due_days = due_days;
        self
    }

    /// Default expiry for a cast starting now
    pub fn default_due(&self) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::days(self.due_days)
    }
}

/// How many of one artifact a player holds. One row per (player, artifact)
/// pair; the row is deleted instead of reaching zero.
#[derive(Debug, Clone)]
pub struct ArtifactHolding {
    pub id: HoldingId,
    pub player_id: PlayerId,
    pub artifact_id: ArtifactId,
    /// Artifact lookup key, denormalized from the artifact row
    pub artifact_name: String,
    pub amount: i64,
}

/// How many of one spell a player has collected for casting. Same
/// delete-at-zero rule as [`ArtifactHolding`].
#[derive(Debug, Clone)]
pub struct SpellHolding {
    pub id: HoldingId,
    pub player_id: PlayerId,
    pub spell_id: SpellId,
    pub spell_name: String,
    pub amount: i64,
}

/// An active spell effect on a player: who cast it and until when.
/// At most one active effect per (player, spell) pair.
#[derive(Debug, Clone)]
pub struct SpellDue {
    pub id: DueId,
    /// The player the spell was cast on
    pub player_id: PlayerId,
    pub spell_id: SpellId,
    pub spell_name: String,
    /// The casting player
    pub source_id: PlayerId,
    pub due: DateTime<Utc>,
}

impl SpellDue {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }
}

/// A modifier currently affecting a player: either an artifact they hold
/// or a spell actively cast on them. Artifact holdings take precedence
/// in lookups.
#[derive(Debug, Clone)]
pub enum ActiveModifier {
    Artifact(ArtifactHolding),
    SpellDue(SpellDue),
}
