use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::rubric::ScoringRubricVersion;

const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Upper bound on every single extraction call.
    pub extraction_timeout: Duration,
    pub rubric: ScoringRubricVersion,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = match std::env::var("EXTRACTION_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("EXTRACTION_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("EXTRACTION_TIMEOUT_SECS must be greater than zero"));
        }

        let label = std::env::var("RUBRIC_VERSION").unwrap_or_else(|_| crate::rubric::STANDARD.to_string());
        let rubric = ScoringRubricVersion::by_label(&label)
            .with_context(|| format!("RUBRIC_VERSION '{label}' is not a known rubric version"))?;

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            extraction_timeout: Duration::from_secs(timeout_secs),
            rubric,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
