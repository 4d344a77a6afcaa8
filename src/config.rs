use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// JSON document holding every collection, keyed by collection name.
    pub db_path: PathBuf,
    /// Fixed artificial latency added to every request.
    pub delay_ms: u64,
    /// Upper bound of the random latency added on top of `delay_ms`.
    pub delay_jitter_ms: u64,
    /// Allowed CORS origins. Empty means permissive.
    pub cors_origins: Vec<String>,
    /// Number of products generated when no database file exists.
    pub seed_count: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            db_path: std::env::var("DB_PATH")
                .unwrap_or_else(|_| "data/db.json".to_string())
                .into(),
            delay_ms: std::env::var("DELAY_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("DELAY_MS must be a non-negative number of milliseconds")?,
            delay_jitter_ms: std::env::var("DELAY_JITTER_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("DELAY_JITTER_MS must be a non-negative number of milliseconds")?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            seed_count: std::env::var("SEED_COUNT")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("SEED_COUNT must be a valid number")?,
        })
    }

    pub fn latency_enabled(&self) -> bool {
        self.delay_ms > 0 || self.delay_jitter_ms > 0
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" http://localhost:5173 ,, https://demo.dev ");
        assert_eq!(origins, vec!["http://localhost:5173", "https://demo.dev"]);
    }

    #[test]
    fn latency_disabled_when_both_delays_zero() {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 3000,
            db_path: "data/db.json".into(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            cors_origins: vec![],
            seed_count: 0,
        };
        assert!(!config.latency_enabled());
        assert!(Config { delay_jitter_ms: 5, ..config }.latency_enabled());
    }
}
