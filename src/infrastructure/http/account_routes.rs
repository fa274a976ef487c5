//! Auth API routes

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::{
    LoginRequestDto, LoginResponseDto, LogoutRequestDto, RegisterRequestDto, RegisterResponseDto,
};
use crate::application::services::RegisterRequest;
use crate::domain::value_objects::SessionToken;
use crate::infrastructure::state::AppState;

/// Register a new account (and its player profile)
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequestDto>,
) -> Result<(StatusCode, Json<RegisterResponseDto>), (StatusCode, String)> {
    let request = RegisterRequest {
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
    };

    let (account, player) = state
        .account_service
        .register(request)
        .await
        .map_err(|e| {
            if e.to_string().contains("already taken") {
                (StatusCode::CONFLICT, e.to_string())
            } else {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponseDto::from_parts(&account, &player)),
    ))
}

/// Open a session for a username
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequestDto>,
) -> Result<Json<LoginResponseDto>, (StatusCode, String)> {
    let token = state
        .account_service
        .login(&req.username)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Unknown username".to_string()))?;

    Ok(Json(LoginResponseDto {
        token: token.to_string(),
    }))
}

/// Close a session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogoutRequestDto>,
) -> Result<StatusCode, (StatusCode, String)> {
    let uuid = Uuid::parse_str(&req.token)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session token".to_string()))?;

    let closed = state
        .account_service
        .logout(SessionToken::from_uuid(uuid))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if closed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Session not active".to_string()))
    }
}
