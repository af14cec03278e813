use std::net::SocketAddr;

use thiserror::Error;

use crate::pipeline::triage::YANDEX_COMPLETION_URL;

/// Application-level constants
pub const APP_NAME: &str = "AI-Triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "ai_triage_lib=info,ai_triage=info,tower_http=warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    /// `YANDEX_CLOUD_API_KEY`. Requests fail with a missing-key error when unset.
    pub api_key: Option<String>,
    /// `YANDEX_CLOUD_FOLDER`, sent as `x-folder-id`.
    pub folder_id: Option<String>,
    /// `YC_AGENT_ID`: model URI, e.g. `gpt://<folder>/yandexgpt/latest`.
    pub model_uri: String,
    /// `TEMPERATURE`
    pub temperature: f64,
    /// `MAX_TOKENS`
    pub max_tokens: u32,
    /// `YANDEX_COMPLETION_URL`
    pub completion_url: String,
    /// `PROVIDER_TIMEOUT_SECS`
    pub provider_timeout_secs: u64,
    /// `TRIAGE_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `CORS_ALLOW_ORIGINS`: comma-separated; empty means any origin.
    pub cors_allow_origins: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            folder_id: None,
            model_uri: String::new(),
            temperature: 0.3,
            max_tokens: 1000,
            completion_url: YANDEX_COMPLETION_URL.to_string(),
            provider_timeout_secs: 60,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_allow_origins: Vec::new(),
        }
    }
}

impl TriageConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            api_key: get("YANDEX_CLOUD_API_KEY"),
            folder_id: get("YANDEX_CLOUD_FOLDER"),
            model_uri: get("YC_AGENT_ID").unwrap_or(defaults.model_uri),
            temperature: parse_or("TEMPERATURE", get("TEMPERATURE"), defaults.temperature)?,
            max_tokens: parse_or("MAX_TOKENS", get("MAX_TOKENS"), defaults.max_tokens)?,
            completion_url: get("YANDEX_COMPLETION_URL").unwrap_or(defaults.completion_url),
            provider_timeout_secs: parse_or(
                "PROVIDER_TIMEOUT_SECS",
                get("PROVIDER_TIMEOUT_SECS"),
                defaults.provider_timeout_secs,
            )?,
            bind_addr: parse_or("TRIAGE_BIND_ADDR", get("TRIAGE_BIND_ADDR"), defaults.bind_addr)?,
            cors_allow_origins: get("CORS_ALLOW_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

/// `"*"` means any origin.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}
