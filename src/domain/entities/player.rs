//! Player entity - the game-facing side of an account

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{AccountId, ExtensionId, PlayerId};

/// Base game profile for an account. Game-specific profiles attach to it
/// as [`PlayerExtension`] records keyed by the same player.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub account_id: AccountId,

    /// Ladder differentiator. Do not modify directly, score through the
    /// scoring service instead.
    pub points: Option<f64>,

    pub level_no: i64,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Player {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            id: PlayerId::new(),
            account_id,
            points: Some(0.0),
            level_no: 1,
            last_seen: None,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = Some(now);
    }

    /// Points with the null state collapsed to zero, for aggregation
    pub fn points_or_zero(&self) -> f64 {
        self.points.unwrap_or(0.0)
    }
}

/// A typed extension of a player, keyed by (player, kind). Replaces
/// subtype tables that would otherwise copy the base player's fields:
/// the base row stays the single source of identity and points, the
/// extension carries only the game-specific payload.
#[derive(Debug, Clone)]
pub struct PlayerExtension {
    pub id: ExtensionId,
    pub player_id: PlayerId,
    /// Extension discriminator, e.g. `qotd` or `challenge`
    pub kind: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl PlayerExtension {
    pub fn new(player_id: PlayerId, kind: impl Into<String>) -> Self {
        Self {
            id: ExtensionId::new(),
            player_id,
            kind: kind.into(),
            data: serde_json::Value::Object(serde_json::Map::new()),
            created_at: Utc::now(),
        }
    }
}
