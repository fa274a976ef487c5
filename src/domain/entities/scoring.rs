//! Scoring history entry - the ledger behind points and coins

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{EntryId, PlayerId};

/// One scoring event. The sum of a player's `points` entries is the value
/// cached on the player row; other coins exist only in the ledger.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub player_id: PlayerId,
    /// Currency name, e.g. `points` or `gold`
    pub coin: String,
    pub amount: f64,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(player_id: PlayerId, coin: impl Into<String>, amount: f64) -> Self {
        Self {
            id: EntryId::new(),
            player_id,
            coin: coin.into(),
            amount,
            recorded_at: Utc::now(),
        }
    }
}
