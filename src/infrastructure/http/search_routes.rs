//! Player search API routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::dto::PlayerResponseDto;
use crate::infrastructure::state::AppState;

const SEARCH_LIMIT: i64 = 50;
const INSTANT_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

async fn run_search(
    state: &AppState,
    query: &str,
    limit: i64,
) -> Result<Vec<PlayerResponseDto>, (StatusCode, String)> {
    let query = query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Empty search query".to_string()));
    }

    let profiles = state
        .repository
        .players()
        .search(query, limit)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(profiles
        .iter()
        .map(|(account, player)| PlayerResponseDto::from_parts(account, player))
        .collect())
}

/// Full search over usernames and real names
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PlayerResponseDto>>, (StatusCode, String)> {
    let results = run_search(&state, &params.q, SEARCH_LIMIT).await?;
    Ok(Json(results))
}

/// Abbreviated search for live suggestion boxes
pub async fn instant_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PlayerResponseDto>>, (StatusCode, String)> {
    let results = run_search(&state, &params.q, INSTANT_LIMIT).await?;
    Ok(Json(results))
}

/// First match only
pub async fn search_one(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PlayerResponseDto>, (StatusCode, String)> {
    let mut results = run_search(&state, &params.q, 1).await?;
    match results.pop() {
        Some(result) => Ok(Json(result)),
        None => Err((StatusCode::NOT_FOUND, "No matching player".to_string())),
    }
}
