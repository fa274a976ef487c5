//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::services::{
    AccountService, GroupService, PlayerServiceImpl, ScoringService, StandardRules, TopService,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::SqliteRepository;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// SQLite repository - exposed for handlers that only read (search)
    pub repository: SqliteRepository,
    // Application services
    pub account_service: AccountService,
    pub player_service: PlayerServiceImpl,
    pub group_service: GroupService,
    pub scoring_service: ScoringService,
    pub top_service: TopService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Initialize SQLite repository
        let repository = SqliteRepository::new(&config.database_url).await?;

        // The standard rules oracle backs level, grant, and cast semantics
        let oracle = Arc::new(StandardRules::new(repository.clone()));

        // Initialize application services
        let account_service = AccountService::new(repository.clone());
        let player_service = PlayerServiceImpl::new(repository.clone(), oracle.clone());
        let group_service = GroupService::new(repository.clone());
        let scoring_service = ScoringService::new(repository.clone());
        let top_service = TopService::new(repository.clone(), oracle);

        Ok(Self {
            config,
            repository,
            account_service,
            player_service,
            group_service,
            scoring_service,
            top_service,
        })
    }
}
