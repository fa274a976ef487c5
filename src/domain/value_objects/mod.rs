//! Value objects - Immutable objects defined by their attributes

mod ids;
mod level;

pub use ids::*;
pub use level::LevelProgress;
