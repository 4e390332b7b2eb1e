use std::env;
use std::time::Duration;

use thiserror::Error;
use tripgenie_llm::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use tripgenie_travel::{default_token_url, TravelDataConfig, DEFAULT_TRAVEL_BASE_URL};
use url::Url;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub gemini: GeminiConfig,
    pub travel: TravelDataConfig,
    /// Empty means any origin is mirrored back.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| read(name).ok_or(ConfigError::Missing(name));

        let gemini_key = required("GEMINI_API_KEY")?;
        let amadeus_key = required("AMADEUS_API_KEY")?;
        let amadeus_secret = required("AMADEUS_API_SECRET")?;

        let timeout = match read("TRIPGENIE_HTTP_TIMEOUT_SECONDS") {
            Some(value) => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "TRIPGENIE_HTTP_TIMEOUT_SECONDS",
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        };

        let gemini_base = validated_url(
            "GEMINI_API_BASE_URL",
            read("GEMINI_API_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        )?;
        let amadeus_base = validated_url(
            "AMADEUS_API_BASE_URL",
            read("AMADEUS_API_BASE_URL").unwrap_or_else(|| DEFAULT_TRAVEL_BASE_URL.to_string()),
        )?;
        let token_url = validated_url(
            "AMADEUS_TOKEN_URL",
            read("AMADEUS_TOKEN_URL").unwrap_or_else(|| default_token_url(&amadeus_base)),
        )?;

        let mut gemini = GeminiConfig::new(gemini_key);
        gemini.model = read("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        gemini.base_url = gemini_base;
        gemini.timeout = timeout;

        let mut travel = TravelDataConfig::with_base_url(amadeus_key, amadeus_secret, amadeus_base);
        travel.token_url = token_url;
        travel.timeout = timeout;

        Ok(Self {
            bind: read("TRIPGENIE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            gemini,
            travel,
            allowed_origins: parse_allowed_origins(read("TRIPGENIE_ALLOWED_ORIGINS")),
        })
    }
}

fn validated_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(_) => Ok(value.trim_end_matches('/').to_string()),
        Err(source) => Err(ConfigError::InvalidUrl {
            name,
            value,
            source,
        }),
    }
}

fn parse_allowed_origins(value: Option<String>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
