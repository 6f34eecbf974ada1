use std::path::PathBuf;

use services::services::commission::DEFAULT_QUALIFYING_FEE;

/// Server configuration, read from the environment (see `.env.example`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub document_root: PathBuf,
    pub commission_threshold: f64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "127.0.0.1"),
            port: env_or("PORT", "3001").parse().unwrap_or(3001),
            database_url: env_or("DATABASE_URL", "sqlite:carelink.db"),
            document_root: PathBuf::from(env_or("DOCUMENT_ROOT", "uploads")),
            commission_threshold: env_or("COMMISSION_THRESHOLD", "")
                .parse()
                .unwrap_or(DEFAULT_QUALIFYING_FEE),
        }
    }
}
