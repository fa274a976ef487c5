//! Artifact, spell, and modifier-accounting API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    AddSpellRequestDto, ArtifactResponseDto, CastSpellRequestDto, CastSpellResponseDto,
    CreateArtifactRequestDto, CreateSpellRequestDto, GiveModifierRequestDto, HoldingResponseDto,
    ModifierResponseDto, SpellDueResponseDto, SpellResponseDto, UseModifierRequestDto,
};
use crate::application::services::{ModifierError, PlayerService};
use crate::domain::entities::{Artifact, Spell};
use crate::domain::value_objects::SpellId;
use crate::infrastructure::http::player_routes::parse_player_id;
use crate::infrastructure::state::AppState;

fn parse_spell_id(id: &str) -> Result<SpellId, (StatusCode, String)> {
    Uuid::parse_str(id)
        .map(SpellId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid spell ID".to_string()))
}

fn modifier_error_response(error: ModifierError) -> (StatusCode, String) {
    match &error {
        ModifierError::Insufficient { .. } => (StatusCode::CONFLICT, error.to_string()),
        ModifierError::UnknownModifier(_)
        | ModifierError::UnknownPlayer(_)
        | ModifierError::UnknownSpell(_) => (StatusCode::NOT_FOUND, error.to_string()),
        ModifierError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

// Definitions

/// Create an artifact definition
pub async fn create_artifact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateArtifactRequestDto>,
) -> Result<(StatusCode, Json<ArtifactResponseDto>), (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Artifact name cannot be empty".to_string()));
    }

    let artifact = Artifact::new(req.name, req.title).with_description(req.description);
    state
        .repository
        .magic()
        .create_artifact(&artifact)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(ArtifactResponseDto::from(artifact))))
}

/// List artifact definitions
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtifactResponseDto>>, (StatusCode, String)> {
    let artifacts = state
        .repository
        .magic()
        .list_artifacts()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(
        artifacts.into_iter().map(ArtifactResponseDto::from).collect(),
    ))
}

/// Create a spell definition
pub async fn create_spell(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSpellRequestDto>,
) -> Result<(StatusCode, Json<SpellResponseDto>), (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Spell name cannot be empty".to_string()));
    }

    let mut spell = Spell::new(req.name, req.title)
        .with_description(req.description)
        .with_price(req.price);
    if let Some(due_days) = req.due_days {
        spell = spell.with_due_days(due_days);
    }

    state
        .repository
        .magic()
        .create_spell(&spell)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(SpellResponseDto::from(spell))))
}

/// List spell definitions
pub async fn list_spells(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SpellResponseDto>>, (StatusCode, String)> {
    let spells = state
        .repository
        .magic()
        .list_spells()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(spells.into_iter().map(SpellResponseDto::from).collect()))
}

// Modifier accounting

/// The modifier affecting a player under `name`, if any
pub async fn get_modifier(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<ModifierResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let modifier = state
        .player_service
        .has_modifier(player_id, &name)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Modifier not active".to_string()))?;

    Ok(Json(ModifierResponseDto::from(modifier)))
}

/// Grant an amount of a named modifier
pub async fn give_modifier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GiveModifierRequestDto>,
) -> Result<Json<Option<HoldingResponseDto>>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let holding = state
        .player_service
        .give_modifier(player_id, &req.modifier, req.amount)
        .await
        .map_err(modifier_error_response)?;

    Ok(Json(holding.map(HoldingResponseDto::from)))
}

/// Withdraw an amount of a named modifier
pub async fn use_modifier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UseModifierRequestDto>,
) -> Result<Json<Option<HoldingResponseDto>>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let holding = state
        .player_service
        .use_modifier(player_id, &req.modifier, req.amount)
        .await
        .map_err(modifier_error_response)?;

    Ok(Json(holding.map(HoldingResponseDto::from)))
}

/// Spells actively affecting a player
pub async fn get_active_spells(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SpellDueResponseDto>>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;

    let dues = state
        .player_service
        .active_spells(player_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(dues.into_iter().map(SpellDueResponseDto::from).collect()))
}

/// Add one of a spell to a player's collection
pub async fn add_spell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddSpellRequestDto>,
) -> Result<Json<HoldingResponseDto>, (StatusCode, String)> {
    let player_id = parse_player_id(&id)?;
    let spell_id = parse_spell_id(&req.spell_id)?;

    let holding = state
        .player_service
        .add_spell(player_id, spell_id)
        .await
        .map_err(modifier_error_response)?;

    Ok(Json(HoldingResponseDto::from(holding)))
}

/// Cast a spell from `source_id` onto the player in the path
pub async fn cast_spell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CastSpellRequestDto>,
) -> Result<Json<CastSpellResponseDto>, (StatusCode, String)> {
    let target = parse_player_id(&id)?;
    let spell_id = parse_spell_id(&req.spell_id)?;
    let source = parse_player_id(&req.source_id)?;

    let cast = state
        .player_service
        .cast_spell(target, spell_id, source, req.due)
        .await
        .map_err(modifier_error_response)?;

    Ok(Json(CastSpellResponseDto { cast }))
}
