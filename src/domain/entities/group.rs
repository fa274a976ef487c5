//! Player group entity - hierarchical grouping of players

use crate::domain::value_objects::GroupId;

/// A group of players, arranged in a tree. `class_rank` orders groups,
/// lower values being more senior; root groups of the same rank are peers.
#[derive(Debug, Clone)]
pub struct PlayerGroup {
    pub id: GroupId,
    pub name: String,
    /// Lower = more senior. Used for ordering and for peer lookups of
    /// root groups.
    pub class_rank: i64,
    /// Parent group, if any. The parent chain must stay acyclic.
    pub parent_id: Option<GroupId>,
    /// Cached aggregate points, used only for sorting and position.
    /// The live value comes from `GroupService::live_points`.
    pub points: f64,
}

impl PlayerGroup {
    pub fn new(name: impl Into<String>, class_rank: i64) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            class_rank,
            parent_id: None,
            points: 0.0,
        }
    }

    pub fn with_parent(mut self, parent_id: GroupId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}
