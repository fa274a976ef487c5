use serde::Serialize;

use crate::application::dto::{LevelProgressDto, PlayerResponseDto};
use crate::application::services::{TopEntry, TopPage};

#[derive(Debug, Serialize)]
pub struct TopEntryDto {
    pub rank: usize,
    pub player: PlayerResponseDto,
    pub progress: LevelProgressDto,
    pub window_points: f64,
}

#[derive(Debug, Serialize)]
pub struct TopPageDto {
    pub entries: Vec<TopEntryDto>,
    pub page: usize,
    pub total_pages: usize,
    pub total_players: usize,
}

impl TopPageDto {
    pub fn from_page(page: TopPage, page_size: usize) -> Self {
        let offset = (page.page - 1) * page_size;
        let entries = page
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry_dto(entry, offset + index + 1))
            .collect();
        Self {
            entries,
            page: page.page,
            total_pages: page.total_pages,
            total_players: page.total_players,
        }
    }
}

fn entry_dto(entry: TopEntry, rank: usize) -> TopEntryDto {
    TopEntryDto {
        rank,
        player: PlayerResponseDto::from_parts(&entry.account, &entry.player),
        progress: entry.progress.into(),
        window_points: entry.window_points,
    }
}
