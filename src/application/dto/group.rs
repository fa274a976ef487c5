use serde::{Deserialize, Serialize};

use crate::domain::entities::PlayerGroup;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequestDto {
    pub name: String,
    #[serde(default)]
    pub class_rank: i64,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponseDto {
    pub id: String,
    pub name: String,
    pub class_rank: i64,
    pub parent_id: Option<String>,
    pub points: f64,
}

impl From<PlayerGroup> for GroupResponseDto {
    fn from(group: PlayerGroup) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name,
            class_rank: group.class_rank,
            parent_id: group.parent_id.map(|id| id.to_string()),
            points: group.points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupPointsResponseDto {
    pub live_points: f64,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequestDto {
    pub player_id: String,
}
