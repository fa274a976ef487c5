//! Level progression snapshot computed by the rules oracle

/// Progress of a player towards the next level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress {
    /// Points gained since the current level's threshold
    pub points_gained: f64,
    /// Points still needed for the next level
    pub points_left: f64,
    /// Number of the next level
    pub next_level: i64,
    /// Fraction of the way to the next level, 0.0..=1.0
    pub percent: f64,
}

impl LevelProgress {
    /// Progress for a player already at the level cap
    pub fn capped(level_no: i64) -> Self {
        Self {
            points_gained: 0.0,
            points_left: 0.0,
            next_level: level_no,
            percent: 1.0,
        }
    }
}
