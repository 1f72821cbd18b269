use anyhow::{bail, Context, Result};

use crate::embedding::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, OPENAI_EMBEDDINGS_URL};
use crate::similarity::scoring::RankingConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    /// Enrichment endpoint. When unset, every LinkedIn lookup degrades to a placeholder.
    pub linkedin_api_url: Option<String>,
    pub linkedin_api_key: Option<String>,
    pub ranking: RankingConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = RankingConfig::default();
        let ranking = RankingConfig {
            embedding_weight: parse_env("SIMILARITY_EMBEDDING_WEIGHT", defaults.embedding_weight)?,
            interest_weight: parse_env("SIMILARITY_INTEREST_WEIGHT", defaults.interest_weight)?,
            top_k: parse_env("SIMILARITY_TOP_K", defaults.top_k)?,
        };
        validate_ranking(&ranking)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            embedding_api_url: std::env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| OPENAI_EMBEDDINGS_URL.to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimensions: parse_env("EMBEDDING_DIMENSIONS", DEFAULT_EMBEDDING_DIMENSIONS)?,
            linkedin_api_url: optional_env("LINKEDIN_API_URL"),
            linkedin_api_key: optional_env("LINKEDIN_API_KEY"),
            ranking,
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} is invalid ({raw}): {e}")),
        Err(_) => Ok(default),
    }
}

fn validate_ranking(ranking: &RankingConfig) -> Result<()> {
    for (name, w) in [
        ("SIMILARITY_EMBEDDING_WEIGHT", ranking.embedding_weight),
        ("SIMILARITY_INTEREST_WEIGHT", ranking.interest_weight),
    ] {
        if !(0.0..=1.0).contains(&w) {
            bail!("{name} must be within [0, 1], got {w}");
        }
    }
    if ((ranking.embedding_weight + ranking.interest_weight) - 1.0).abs() > 1e-6 {
        bail!(
            "Similarity weights must sum to 1, got {} + {}",
            ranking.embedding_weight,
            ranking.interest_weight
        );
    }
    if ranking.top_k == 0 {
        bail!("SIMILARITY_TOP_K must be at least 1");
    }
    Ok(())
}
