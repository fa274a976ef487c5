//! Top Service - leaderboard pages
//!
//! Ranks all players either overall or over the past week, sorted by
//! points, level progress, or recency.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::instrument;

use crate::application::ports::outbound::RulesOracle;
use crate::domain::entities::{Account, Player};
use crate::domain::value_objects::LevelProgress;
use crate::infrastructure::persistence::SqliteRepository;

pub const PAGE_SIZE: usize = 20;

/// Ranking window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopWindow {
    Overall,
    PastWeek,
}

impl TopWindow {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Overall),
            1 => Some(Self::PastWeek),
            _ => None,
        }
    }
}

/// Ranking order, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    Points,
    Progress,
    LastSeen,
}

impl SortCriterion {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Points),
            1 => Some(Self::Progress),
            2 => Some(Self::LastSeen),
            _ => None,
        }
    }
}

/// One leaderboard row
#[derive(Debug, Clone)]
pub struct TopEntry {
    pub account: Account,
    pub player: Player,
    pub progress: LevelProgress,
    /// Points within the requested window (equals total points for
    /// [`TopWindow::Overall`])
    pub window_points: f64,
}

/// One page of the leaderboard, 1-based
#[derive(Debug, Clone)]
pub struct TopPage {
    pub entries: Vec<TopEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total_players: usize,
}

pub struct TopService {
    repository: SqliteRepository,
    oracle: Arc<dyn RulesOracle>,
}

impl TopService {
    pub fn new(repository: SqliteRepository, oracle: Arc<dyn RulesOracle>) -> Self {
        Self { repository, oracle }
    }

    #[instrument(skip(self))]
    pub async fn top(
        &self,
        window: TopWindow,
        sort: SortCriterion,
        page: usize,
    ) -> Result<TopPage> {
        let profiles = self
            .repository
            .players()
            .list_with_accounts()
            .await
            .context("Failed to list players for leaderboard")?;

        let week_ago = Utc::now() - Duration::days(7);
        let mut entries = Vec::with_capacity(profiles.len());
        for (account, player) in profiles {
            let progress = self.oracle.level_progress(&player).await?;
            let window_points = match window {
                TopWindow::Overall => player.points_or_zero(),
                TopWindow::PastWeek => {
                    self.repository
                        .scoring()
                        .points_since(player.id, week_ago)
                        .await?
                }
            };
            entries.push(TopEntry {
                account,
                player,
                progress,
                window_points,
            });
        }

        match sort {
            SortCriterion::Points => entries.sort_by(|a, b| {
                b.window_points
                    .partial_cmp(&a.window_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortCriterion::Progress => entries.sort_by(|a, b| {
                b.progress
                    .percent
                    .partial_cmp(&a.progress.percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortCriterion::LastSeen => {
                entries.sort_by(|a, b| b.player.last_seen.cmp(&a.player.last_seen))
            }
        }

        let total_players = entries.len();
        let total_pages = total_players.div_ceil(PAGE_SIZE).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * PAGE_SIZE;
        let entries = entries
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect();

        Ok(TopPage {
            entries,
            page,
            total_pages,
            total_players,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{StandardRules, POINTS_COIN};
    use crate::domain::entities::HistoryEntry;

    async fn service() -> (SqliteRepository, TopService) {
        let repository = SqliteRepository::in_memory().await.unwrap();
        let oracle = Arc::new(StandardRules::new(repository.clone()));
        let service = TopService::new(repository.clone(), oracle);
        (repository, service)
    }

    async fn seed_player(repository: &SqliteRepository, username: &str, points: f64) -> Player {
        let account = Account::new(username);
        repository.accounts().create(&account).await.unwrap();
        let mut player = Player::new(account.id);
        player.points = Some(points);
        repository.players().create(&player).await.unwrap();
        player
    }

    #[tokio::test]
    async fn overall_top_sorts_by_points_descending() {
        let (repository, service) = service().await;
        seed_player(&repository, "low", 5.0).await;
        seed_player(&repository, "high", 50.0).await;
        seed_player(&repository, "mid", 20.0).await;

        let page = service
            .top(TopWindow::Overall, SortCriterion::Points, 1)
            .await
            .unwrap();
        let names: Vec<&str> = page
            .entries
            .iter()
            .map(|e| e.account.username.as_str())
            .collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        assert_eq!(page.total_players, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn weekly_window_only_counts_recent_entries() {
        let (repository, service) = service().await;
        let player = seed_player(&repository, "ada", 100.0).await;
        let rival = seed_player(&repository, "grace", 0.0).await;

        // An old score for ada, a fresh one for grace
        let mut stale = HistoryEntry::new(player.id, POINTS_COIN, 100.0);
        stale.recorded_at = Utc::now() - Duration::days(30);
        repository.scoring().append(&stale).await.unwrap();

        let fresh = HistoryEntry::new(rival.id, POINTS_COIN, 10.0);
        repository.scoring().append(&fresh).await.unwrap();

        let page = service
            .top(TopWindow::PastWeek, SortCriterion::Points, 1)
            .await
            .unwrap();
        assert_eq!(page.entries[0].account.username, "grace");
        assert_eq!(page.entries[0].window_points, 10.0);
        assert_eq!(page.entries[1].window_points, 0.0);
    }

    #[tokio::test]
    async fn last_seen_sort_puts_never_seen_players_last() {
        let (repository, service) = service().await;
        let mut seen = seed_player(&repository, "seen", 0.0).await;
        seed_player(&repository, "ghost", 99.0).await;

        seen.touch(Utc::now());
        repository.players().update(&seen).await.unwrap();

        let page = service
            .top(TopWindow::Overall, SortCriterion::LastSeen, 1)
            .await
            .unwrap();
        assert_eq!(page.entries[0].account.username, "seen");
    }

    #[tokio::test]
    async fn out_of_range_pages_clamp() {
        let (repository, service) = service().await;
        seed_player(&repository, "only", 1.0).await;

        let page = service
            .top(TopWindow::Overall, SortCriterion::Points, 99)
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.entries.len(), 1);
    }
}
