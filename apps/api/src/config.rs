use anyhow::{bail, Context, Result};

use crate::llm_client::Provider;

/// Upper bound on follow-ups per base question accepted from config or requests.
pub const MAX_FOLLOWUPS_LIMIT: u32 = 3;

/// Application configuration loaded from environment variables.
/// Fails at startup if the selected provider's API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_followups: u32,
    pub template_path: String,
    /// Interviews untouched this long are discarded.
    pub interview_ttl_minutes: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(raw) => raw.parse::<Provider>()?,
            Err(_) => Provider::Groq,
        };

        let api_key = require_env(provider.api_key_var())?;

        let model = std::env::var("LLM_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_string());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| "0.3".to_string())
            .parse::<f32>()
            .context("LLM_TEMPERATURE must be a number")?;

        let max_followups = std::env::var("MAX_FOLLOWUPS")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("MAX_FOLLOWUPS must be a non-negative integer")?;
        if max_followups > MAX_FOLLOWUPS_LIMIT {
            bail!("MAX_FOLLOWUPS must be between 0 and {MAX_FOLLOWUPS_LIMIT}, got {max_followups}");
        }

        let interview_ttl_minutes = std::env::var("INTERVIEW_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("INTERVIEW_TTL_MINUTES must be a non-negative integer")?;
        if interview_ttl_minutes == 0 {
            bail!("INTERVIEW_TTL_MINUTES must be at least 1");
        }

        Ok(Config {
            provider,
            api_key,
            model,
            temperature,
            max_followups,
            template_path: std::env::var("TEMPLATE_PATH")
                .unwrap_or_else(|_| "templates/ai_engineer.toml".to_string()),
            interview_ttl_minutes,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}
