//! HTTP REST API routes

mod account_routes;
mod group_routes;
mod magic_routes;
mod player_routes;
mod search_routes;
mod top_routes;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use account_routes::*;
pub use group_routes::*;
pub use magic_routes::*;
pub use player_routes::*;
pub use search_routes::*;
pub use top_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Leaderboard
        .route(
            "/api/top/{toptype}/{sortcrit}/{page}",
            get(top_routes::get_top),
        )
        // Auth
        .route("/api/auth/register", post(account_routes::register))
        .route("/api/auth/login", post(account_routes::login))
        .route("/api/auth/logout", post(account_routes::logout))
        // Players
        .route("/api/players/{id}", get(player_routes::get_player))
        .route(
            "/api/players/{id}/profile",
            get(player_routes::get_profile),
        )
        .route("/api/players/{id}/coins", get(player_routes::get_coins))
        .route("/api/players/{id}/score", post(player_routes::score))
        .route(
            "/api/players/{id}/extensions/{kind}",
            get(player_routes::get_extension),
        )
        .route("/api/players/{id}/groups", get(group_routes::get_player_groups))
        // Modifier accounting
        .route(
            "/api/players/{id}/modifiers/{name}",
            get(magic_routes::get_modifier),
        )
        .route(
            "/api/players/{id}/modifiers/give",
            post(magic_routes::give_modifier),
        )
        .route(
            "/api/players/{id}/modifiers/use",
            post(magic_routes::use_modifier),
        )
        .route(
            "/api/players/{id}/spells",
            get(magic_routes::get_active_spells),
        )
        .route(
            "/api/players/{id}/spells/add",
            post(magic_routes::add_spell),
        )
        .route(
            "/api/players/{id}/spells/cast",
            post(magic_routes::cast_spell),
        )
        // Groups
        .route("/api/groups", get(group_routes::list_groups))
        .route("/api/groups", post(group_routes::create_group))
        .route("/api/groups/{id}", get(group_routes::get_group))
        .route(
            "/api/groups/{id}/children",
            get(group_routes::get_children),
        )
        .route("/api/groups/{id}/sisters", get(group_routes::get_sisters))
        .route("/api/groups/{id}/points", get(group_routes::get_points))
        .route(
            "/api/groups/{id}/points/refresh",
            post(group_routes::refresh_points),
        )
        .route("/api/groups/{id}/members", post(group_routes::add_member))
        .route(
            "/api/groups/{id}/members/{player_id}",
            delete(group_routes::remove_member),
        )
        // Search
        .route("/api/search", get(search_routes::search))
        .route("/api/search/instant", get(search_routes::instant_search))
        .route("/api/search/one", get(search_routes::search_one))
        // Artifact and spell definitions
        .route("/api/artifacts", get(magic_routes::list_artifacts))
        .route("/api/artifacts", post(magic_routes::create_artifact))
        .route("/api/spells", get(magic_routes::list_spells))
        .route("/api/spells", post(magic_routes::create_spell))
}

#[derive(Serialize)]
pub struct HomepageDto {
    pub name: &'static str,
    pub version: &'static str,
}

/// Platform summary served at the root path
pub async fn homepage() -> Json<HomepageDto> {
    Json(HomepageDto {
        name: "Guildhall",
        version: env!("CARGO_PKG_VERSION"),
    })
}
