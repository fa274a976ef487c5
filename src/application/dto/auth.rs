use serde::{Deserialize, Serialize};

use crate::domain::entities::{Account, Player};

#[derive(Debug, Deserialize)]
pub struct RegisterRequestDto {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponseDto {
    pub account_id: String,
    pub player_id: String,
    pub username: String,
}

impl RegisterResponseDto {
    pub fn from_parts(account: &Account, player: &Player) -> Self {
        Self {
            account_id: account.id.to_string(),
            player_id: player.id.to_string(),
            username: account.username.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequestDto {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseDto {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequestDto {
    pub token: String,
}
