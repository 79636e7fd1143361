use crate::retry::RetryConfig;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Web server settings.
#[derive(Debug, Clone)]
pub struct Config {
    // Site
    pub site_url: String,
    pub site_name: String,
    pub content_dir: PathBuf,
    pub port: u16,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            site_url: site_url_from_env()?,
            site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "GoalGazer".to_string()),
            content_dir: content_dir_from_env(),
            port: parse_var("PORT", 8080)?,

            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: bounded_var("DATABASE_MAX_CONNECTIONS", 5, 1, 100)?,
        })
    }
}

/// One OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Offline generator settings (translation and audit binaries).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub content_dir: PathBuf,

    pub database_url: String,
    pub database_max_connections: u32,

    /// Tried in order; the first entry is the primary provider
    pub providers: Vec<ProviderConfig>,

    pub translation_max_attempts: u32,
    pub retry_delay: Duration,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let parity = RetryConfig::translation_parity();
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let api_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string());
        require_http_url("OPENAI_API_URL", &api_url)?;

        let mut providers = vec![ProviderConfig {
            name: "primary".to_string(),
            api_url,
            api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            model: model.clone(),
        }];

        if let Ok(fallback_url) = std::env::var("FALLBACK_LLM_API_URL") {
            require_http_url("FALLBACK_LLM_API_URL", &fallback_url)?;
            providers.push(ProviderConfig {
                name: "fallback".to_string(),
                api_url: fallback_url,
                api_key: std::env::var("FALLBACK_LLM_API_KEY")
                    .context("FALLBACK_LLM_API_KEY must be set with FALLBACK_LLM_API_URL")?,
                model: std::env::var("FALLBACK_LLM_MODEL").unwrap_or(model),
            });
        }

        Ok(Self {
            content_dir: content_dir_from_env(),

            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: bounded_var("DATABASE_MAX_CONNECTIONS", 5, 1, 100)?,

            providers,

            translation_max_attempts: bounded_var(
                "TRANSLATION_MAX_ATTEMPTS",
                parity.max_attempts,
                1,
                10,
            )?,
            retry_delay: Duration::from_millis(parse_var(
                "RETRY_DELAY_MS",
                parity.initial_delay.as_millis() as u64,
            )?),
        })
    }

    /// Regeneration budget for translations rejected by parity validation.
    pub fn translation_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.translation_max_attempts,
            initial_delay: self.retry_delay,
            max_delay: self.retry_delay,
            ..RetryConfig::translation_parity()
        }
    }
}

/// `CONTENT_DIR`, defaulting to `content`.
pub fn content_dir_from_env() -> PathBuf {
    std::env::var("CONTENT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("content"))
}

fn site_url_from_env() -> Result<String> {
    let url = std::env::var("SITE_URL").context("SITE_URL not set")?;
    require_http_url("SITE_URL", &url)?;
    Ok(url.trim_end_matches('/').to_string())
}

fn require_http_url(name: &str, value: &str) -> Result<()> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => bail!("{} must be an http(s) URL, got '{}'", name, value),
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn bounded_var(name: &str, default: u32, min: u32, max: u32) -> Result<u32> {
    let value = parse_var(name, default)?;
    if !(min..=max).contains(&value) {
        bail!("{} must be between {} and {}, got {}", name, min, max, value);
    }
    Ok(value)
}
