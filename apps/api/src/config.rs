use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::recommendation::schema::SchemaVariant;

const DEFAULT_CATALOG_PATH: &str = "data/catalog.csv";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-001";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub catalog_path: String,
    pub response_schema: SchemaVariant,
    /// Upper bound on a single model call, retries and backoff included.
    /// The client divides it between attempts; see `GeminiClient::from_config`.
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_timeout = parse_timeout_secs(
            &std::env::var("LLM_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string()),
        )?;

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            catalog_path: std::env::var("CATALOG_PATH")
                .unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string()),
            response_schema: std::env::var("RESPONSE_SCHEMA")
                .unwrap_or_else(|_| "standard".to_string())
                .parse::<SchemaVariant>()
                .map_err(|e| anyhow!("RESPONSE_SCHEMA must be 'standard' or 'labeled': {e}"))?,
            llm_timeout,
            llm_max_retries: std::env::var("LLM_MAX_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u32>()
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("LLM_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"))?;
    if secs == 0 {
        anyhow::bail!("LLM_TIMEOUT_SECS must be at least 1");
    }
    Ok(Duration::from_secs(secs))
}
