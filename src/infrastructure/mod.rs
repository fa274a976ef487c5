//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite adapters for data storage
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state
//! - Workers: background maintenance loops

pub mod config;
pub mod http;
pub mod persistence;
pub mod state;
pub mod workers;
