//! Application configuration

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database URL
    pub database_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between spell-expiry sweeps
    pub expiry_sweep_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/guildhall.db".to_string()),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            expiry_sweep_secs: env::var("EXPIRY_SWEEP_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("EXPIRY_SWEEP_SECS must be a number of seconds")?,
        })
    }
}
