use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://course_advisor.db?mode=rwc";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "deepseek-chat";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: 1500,
            temperature: 0.7,
        }
    }
}

impl CompletionConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            api_key: optional("COMPLETION_API_KEY"),
            api_url: optional("COMPLETION_API_URL").unwrap_or(defaults.api_url),
            model: optional("COMPLETION_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or("COMPLETION_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or("COMPLETION_TEMPERATURE", defaults.temperature)?,
        })
    }
}

/// Process configuration, read once at startup and handed to the components that need it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub completion: CompletionConfig,
    /// Skip the live completion tier entirely.
    pub offline: bool,
    pub seed_on_start: bool,
    pub frontend_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = parse_or("HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = parse_or("PORT", 5001)?;

        let config = Self {
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: SocketAddr::new(host, port),
            completion: CompletionConfig::new_from_env()?,
            offline: parse_bool_or("ADVISOR_OFFLINE", false)?,
            seed_on_start: parse_bool_or("SEED_ON_START", true)?,
            frontend_origin: optional("FRONTEND_URL"),
        };

        if config.completion.api_key.is_none() && !config.offline {
            info!("COMPLETION_API_KEY not set, recommendations will use the catalog fallback");
        }

        Ok(config)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: format!("{} ({})", raw, e),
        }),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn parse_bool_or(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(key) {
        Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
            key,
            message: format!("{} is not a boolean", raw),
        }),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
