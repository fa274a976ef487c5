//! Leaderboard API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::TopPageDto;
use crate::application::services::{SortCriterion, TopWindow, PAGE_SIZE};
use crate::infrastructure::state::AppState;

/// One leaderboard page.
///
/// `toptype`: 0 = overall, 1 = past week.
/// `sortcrit`: 0 = points, 1 = level progress, 2 = last seen.
pub async fn get_top(
    State(state): State<Arc<AppState>>,
    Path((toptype, sortcrit, page)): Path<(i64, i64, usize)>,
) -> Result<Json<TopPageDto>, (StatusCode, String)> {
    let window = TopWindow::from_index(toptype)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Invalid top type".to_string()))?;
    let sort = SortCriterion::from_index(sortcrit)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Invalid sort criterion".to_string()))?;

    let result = state
        .top_service
        .top(window, sort, page.max(1))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(TopPageDto::from_page(result, PAGE_SIZE)))
}
