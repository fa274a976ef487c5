//! Account Service - registration, sessions, and presence
//!
//! Registration creates the account and its player profile in one flow,
//! so every account always has exactly one player row.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::entities::{Account, Player};
use crate::domain::value_objects::SessionToken;
use crate::infrastructure::persistence::SqliteRepository;

/// Request to register a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub struct AccountService {
    repository: SqliteRepository,
}

impl AccountService {
    pub fn new(repository: SqliteRepository) -> Self {
        Self { repository }
    }

    fn validate_register_request(request: &RegisterRequest) -> Result<()> {
        let username = request.username.trim();
        if username.is_empty() {
            anyhow::bail!("Username cannot be empty");
        }
        if username.len() > 64 {
            anyhow::bail!("Username cannot exceed 64 characters");
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            anyhow::bail!("Username may only contain letters, digits, '-', '_' and '.'");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<(Account, Player)> {
        Self::validate_register_request(&request)?;

        if self
            .repository
            .accounts()
            .get_by_username(&request.username)
            .await?
            .is_some()
        {
            anyhow::bail!("Username already taken: {}", request.username);
        }

        let mut account = Account::new(request.username.trim());
        if let (Some(first), Some(last)) = (&request.first_name, &request.last_name) {
            account = account.with_name(first, last);
        } else if let Some(first) = &request.first_name {
            account = account.with_name(first, "");
        }
        if let Some(email) = request.email {
            account = account.with_email(email);
        }

        self.repository
            .accounts()
            .create(&account)
            .await
            .context("Failed to create account")?;

        // The player profile rides along with the account
        let player = Player::new(account.id);
        self.repository
            .players()
            .create(&player)
            .await
            .context("Failed to create player for account")?;

        info!(account_id = %account.id, player_id = %player.id, "Registered account: {}", account.username);
        Ok((account, player))
    }

    /// Open a session for a username. Returns `None` for unknown users.
    #[instrument(skip(self))]
    pub async fn login(&self, username: &str) -> Result<Option<SessionToken>> {
        let account = match self.repository.accounts().get_by_username(username).await? {
            Some(account) => account,
            None => return Ok(None),
        };

        let token = SessionToken::new();
        self.repository
            .accounts()
            .create_session(token, account.id)
            .await
            .context("Failed to create session")?;

        // Presence: logging in counts as being seen
        if let Some(mut player) = self
            .repository
            .players()
            .get_by_account(account.id)
            .await?
        {
            player.touch(Utc::now());
            self.repository.players().update(&player).await?;
        }

        info!(account_id = %account.id, "Session opened for {}", account.username);
        Ok(Some(token))
    }

    /// Close a session. Returns false when the token was not active.
    #[instrument(skip(self))]
    pub async fn logout(&self, token: SessionToken) -> Result<bool> {
        self.repository
            .accounts()
            .delete_session(token)
            .await
            .context("Failed to delete session")
    }

    /// Resolve a session token back to its account
    #[instrument(skip(self))]
    pub async fn authenticate(&self, token: SessionToken) -> Result<Option<Account>> {
        let account_id = match self.repository.accounts().session_account(token).await? {
            Some(account_id) => account_id,
            None => return Ok(None),
        };
        self.repository.accounts().get(account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            first_name: None,
            last_name: None,
            email: None,
        }
    }

    #[test]
    fn register_request_validation() {
        assert!(AccountService::validate_register_request(&request("")).is_err());
        assert!(AccountService::validate_register_request(&request("has space")).is_err());
        assert!(AccountService::validate_register_request(&request("ada.l-01")).is_ok());
    }

    #[tokio::test]
    async fn register_creates_the_player_alongside_the_account() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = AccountService::new(repository.clone());

        let (account, player) = service.register(request("ada")).await.unwrap();
        assert_eq!(player.account_id, account.id);

        let stored = repository
            .players()
            .get_by_account(account.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, player.id);
        assert_eq!(stored.level_no, 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_refused() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = AccountService::new(repository);

        service.register(request("ada")).await.unwrap();
        assert!(service.register(request("ada")).await.is_err());
    }

    #[tokio::test]
    async fn login_touches_last_seen_and_opens_a_session() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = AccountService::new(repository.clone());

        let (account, player) = service.register(request("ada")).await.unwrap();
        assert!(player.last_seen.is_none());

        let token = service.login("ada").await.unwrap().unwrap();
        let seen = repository.players().get(player.id).await.unwrap().unwrap();
        assert!(seen.last_seen.is_some());

        let authenticated = service.authenticate(token).await.unwrap().unwrap();
        assert_eq!(authenticated.id, account.id);

        assert!(service.logout(token).await.unwrap());
        assert!(service.authenticate(token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_for_unknown_user_returns_none() {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let service = AccountService::new(repository);
        assert!(service.login("nobody").await.unwrap().is_none());
    }
}
