//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP) can
//! serialize/deserialize without pulling serde into the domain model.

pub mod auth;
pub mod group;
pub mod magic;
pub mod player;
pub mod top;

pub use auth::*;
pub use group::*;
pub use magic::*;
pub use player::*;
pub use top::*;
