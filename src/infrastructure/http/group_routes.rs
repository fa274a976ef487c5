//! Group API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    AddMemberRequestDto, CreateGroupRequestDto, GroupPointsResponseDto, GroupResponseDto,
};
use crate::application::services::CreateGroupRequest;
use crate::domain::value_objects::GroupId;
use crate::infrastructure::http::player_routes::parse_player_id;
use crate::infrastructure::state::AppState;

fn parse_group_id(id: &str) -> Result<GroupId, (StatusCode, String)> {
    Uuid::parse_str(id)
        .map(GroupId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid group ID".to_string()))
}

/// List all groups
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GroupResponseDto>>, (StatusCode, String)> {
    let groups = state
        .group_service
        .list_groups()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(groups.into_iter().map(GroupResponseDto::from).collect()))
}

/// Create a group
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGroupRequestDto>,
) -> Result<(StatusCode, Json<GroupResponseDto>), (StatusCode, String)> {
    let parent_id = match req.parent_id {
        Some(parent) => Some(parse_group_id(&parent)?),
        None => None,
    };

    let request = CreateGroupRequest {
        name: req.name,
        class_rank: req.class_rank,
        parent_id,
    };

    let group = state
        .group_service
        .create_group(request)
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                (StatusCode::NOT_FOUND, e.to_string())
            } else {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
        })?;

    Ok((StatusCode::CREATED, Json(GroupResponseDto::from(group))))
}

/// Get a group by ID
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponseDto>, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;

    let group = state
        .group_service
        .get_group(group_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Group not found".to_string()))?;

    Ok(Json(GroupResponseDto::from(group)))
}

/// Direct subgroups
pub async fn get_children(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupResponseDto>>, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;

    let children = state
        .group_service
        .children(group_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(
        children.into_iter().map(GroupResponseDto::from).collect(),
    ))
}

/// Sister groups (same parent, or same class rank among roots)
pub async fn get_sisters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupResponseDto>>, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;

    let sisters = state
        .group_service
        .sisters(group_id)
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                (StatusCode::NOT_FOUND, "Group not found".to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    Ok(Json(
        sisters.into_iter().map(GroupResponseDto::from).collect(),
    ))
}

/// Live sum of member points
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GroupPointsResponseDto>, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;

    let live_points = state
        .group_service
        .live_points(group_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(GroupPointsResponseDto { live_points }))
}

/// Recompute the cached points column from live member points
pub async fn refresh_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponseDto>, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;

    let group = state
        .group_service
        .refresh_cached_points(group_id)
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                (StatusCode::NOT_FOUND, "Group not found".to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    Ok(Json(GroupResponseDto::from(group)))
}

/// Add a player to a group
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequestDto>,
) -> Result<StatusCode, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;
    let player_id = parse_player_id(&req.player_id)?;

    state
        .group_service
        .add_member(group_id, player_id)
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                (StatusCode::NOT_FOUND, e.to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a player from a group
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((id, player_id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let group_id = parse_group_id(&id)?;
    let player_id = parse_player_id(&player_id)?;

    let removed = state
        .group_service
        .remove_member(group_id, player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Membership not found".to_string()))
    }
}

/// Groups a player belongs to
pub async fn get_player_groups(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupResponseDto>>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let groups = state
        .group_service
        .groups_of(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(groups.into_iter().map(GroupResponseDto::from).collect()))
}
