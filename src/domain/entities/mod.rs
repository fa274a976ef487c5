//! Domain entities - Core business objects with identity

mod account;
mod group;
mod magic;
mod player;
mod scoring;

pub use account::Account;
pub use group::PlayerGroup;
pub use magic::{
    ActiveModifier, Artifact, ArtifactHolding, Spell, SpellDue, SpellHolding,
};
pub use player::{Player, PlayerExtension};
pub use scoring::HistoryEntry;
