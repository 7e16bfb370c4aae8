//! Configuration management

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Distance-matrix API base URL (optional, defaults to the hosted endpoint)
    pub directions_api_url: Option<String>,

    /// Distance-matrix API key (optional; without it travel legs use
    /// offline estimates)
    pub directions_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let directions_api_url = std::env::var("DIRECTIONS_API_URL").ok();

        let directions_api_key = std::env::var("DIRECTIONS_API_KEY").ok();

        Ok(Self {
            nats_url,
            database_url,
            directions_api_url,
            directions_api_key,
        })
    }
}
