//! Application services - use case implementations

mod account_service;
mod group_service;
mod player_service;
mod rules_service;
mod scoring_service;
mod top_service;

pub use account_service::{AccountService, RegisterRequest};
pub use group_service::{CreateGroupRequest, GroupService};
pub use player_service::{ModifierError, PlayerService, PlayerServiceImpl};
pub use rules_service::StandardRules;
pub use scoring_service::{ScoringService, POINTS_COIN};
pub use top_service::{
    SortCriterion, TopEntry, TopPage, TopService, TopWindow, PAGE_SIZE,
};
