use anyhow::{bail, Context, Result};

use crate::crawler::DEFAULT_CRAWL_TIMEOUT_SECS;

/// Which persistence backend the service runs against. Chosen once at
/// startup; there is no runtime fallback between backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Required when the backend is Postgres.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub crawl_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected 'postgres' or 'memory')"),
        };

        let database_url = match storage_backend {
            StorageBackend::Postgres => Some(require_env("DATABASE_URL")?),
            StorageBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        Ok(Config {
            storage_backend,
            database_url,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            crawl_timeout_secs: std::env::var("CRAWL_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_CRAWL_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .context("CRAWL_TIMEOUT_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
