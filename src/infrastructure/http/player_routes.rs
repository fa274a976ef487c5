//! Player API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    CoinsResponseDto, ExtensionResponseDto, PlayerResponseDto, ProfileResponseDto,
};
use crate::application::services::PlayerService;
use crate::domain::value_objects::PlayerId;
use crate::infrastructure::state::AppState;

pub(super) fn parse_player_id(id: &str) -> Result<PlayerId, (StatusCode, String)> {
    Uuid::parse_str(id)
        .map(PlayerId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid player ID".to_string()))
}

async fn load_player_dto(
    state: &AppState,
    player_id: PlayerId,
) -> Result<PlayerResponseDto, (StatusCode, String)> {
    let player = state
        .player_service
        .get(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Player not found".to_string()))?;

    let account = state
        .repository
        .accounts()
        .get(player.account_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Account not found".to_string()))?;

    Ok(PlayerResponseDto::from_parts(&account, &player))
}

/// Get a player by ID
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PlayerResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;
    let dto = load_player_dto(&state, player_id).await?;
    Ok(Json(dto))
}

/// Full profile: player, level, progress, proximate group, active spells
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;
    let player = load_player_dto(&state, player_id).await?;

    let level = state
        .player_service
        .level(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let progress = state
        .player_service
        .level_progress(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let proximate_group = state
        .player_service
        .proximate_group(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let active_spells = state
        .player_service
        .active_spells(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(ProfileResponseDto {
        player,
        level: level.map(Into::into),
        progress: progress.into(),
        proximate_group: proximate_group.map(Into::into),
        active_spells: active_spells.into_iter().map(Into::into).collect(),
    }))
}

/// The player's typed extension for `kind`, created on first access
pub async fn get_extension(
    State(state): State<Arc<AppState>>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<ExtensionResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    // Extensions ride on the player row; refuse them for unknown players
    let _ = load_player_dto(&state, player_id).await?;

    let extension = state
        .player_service
        .extension(player_id, &kind)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(ExtensionResponseDto::from(extension)))
}

#[derive(Debug, serde::Deserialize)]
pub struct ScoreRequestDto {
    pub coin: String,
    pub amount: f64,
}

/// Record a scoring event for a player
pub async fn score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ScoreRequestDto>,
) -> Result<Json<PlayerResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    state
        .scoring_service
        .score(player_id, &req.coin, req.amount)
        .await
        .map_err(|e| {
            if e.to_string().contains("not found") {
                (StatusCode::NOT_FOUND, "Player not found".to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    let dto = load_player_dto(&state, player_id).await?;
    Ok(Json(dto))
}

/// Per-coin ledger totals for a player
pub async fn get_coins(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CoinsResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let totals = state
        .player_service
        .coins(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(CoinsResponseDto::from_totals(totals)))
}
