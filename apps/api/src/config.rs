use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Nothing is required: without `OPENAI_API_KEY` every email comes from templates.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Overrides the chat-completions URL (proxies, local gateways).
    pub openai_api_url: Option<String>,
    /// Per-attempt HTTP timeout. Timeouts are not retried, so this is also the
    /// longest a request waits on the model before falling back to templates.
    pub llm_timeout_secs: u64,
    /// Global switch for remote generation.
    pub use_ai: bool,
    /// TOML catalog replacing the embedded one.
    pub template_catalog_path: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_api_url: None,
            llm_timeout_secs: 30,
            use_ai: true,
            template_catalog_path: None,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_api_url: optional_env("OPENAI_API_URL"),
            llm_timeout_secs: match optional_env("LLM_TIMEOUT_SECS") {
                Some(v) => v
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
                None => defaults.llm_timeout_secs,
            },
            use_ai: match optional_env("USE_AI") {
                Some(v) => parse_bool(&v).context("USE_AI must be true or false")?,
                None => defaults.use_ai,
            },
            template_catalog_path: optional_env("TEMPLATE_CATALOG_PATH"),
            port: match optional_env("PORT") {
                Some(v) => v
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognized boolean '{other}'"),
    }
}
