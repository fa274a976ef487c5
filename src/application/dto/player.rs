use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::dto::{
    ArtifactResponseDto, GroupResponseDto, SpellDueResponseDto,
};
use crate::domain::entities::{Account, Player, PlayerExtension};
use crate::domain::value_objects::LevelProgress;

#[derive(Debug, Serialize)]
pub struct PlayerResponseDto {
    pub id: String,
    pub account_id: String,
    pub username: String,
    pub display_name: String,
    pub points: Option<f64>,
    pub level_no: i64,
    pub last_seen: Option<DateTime<Utc>>,
}

impl PlayerResponseDto {
    pub fn from_parts(account: &Account, player: &Player) -> Self {
        Self {
            id: player.id.to_string(),
            account_id: account.id.to_string(),
            username: account.username.clone(),
            display_name: account.display_name(),
            points: player.points,
            level_no: player.level_no,
            last_seen: player.last_seen,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LevelProgressDto {
    pub points_gained: f64,
    pub points_left: f64,
    pub next_level: i64,
    pub percent: f64,
}

impl From<LevelProgress> for LevelProgressDto {
    fn from(progress: LevelProgress) -> Self {
        Self {
            points_gained: progress.points_gained,
            points_left: progress.points_left,
            next_level: progress.next_level,
            percent: progress.percent,
        }
    }
}

/// Full profile page payload
#[derive(Debug, Serialize)]
pub struct ProfileResponseDto {
    pub player: PlayerResponseDto,
    pub level: Option<ArtifactResponseDto>,
    pub progress: LevelProgressDto,
    pub proximate_group: Option<GroupResponseDto>,
    pub active_spells: Vec<SpellDueResponseDto>,
}

#[derive(Debug, Serialize)]
pub struct ExtensionResponseDto {
    pub id: String,
    pub kind: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<PlayerExtension> for ExtensionResponseDto {
    fn from(extension: PlayerExtension) -> Self {
        Self {
            id: extension.id.to_string(),
            kind: extension.kind,
            data: extension.data,
            created_at: extension.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CoinsResponseDto {
    pub coins: BTreeMap<String, f64>,
}

impl CoinsResponseDto {
    pub fn from_totals(totals: Vec<(String, f64)>) -> Self {
        Self {
            coins: totals.into_iter().collect(),
        }
    }
}
