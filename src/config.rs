//! Runtime configuration from environment variables (and `.env` via dotenv)

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::{OllamaClient, YahooClient};
use crate::models::ModelRouting;
use crate::utils::RetryPolicy;

pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Errors related to application configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used
    #[error("Invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ollama_host: String,
    pub models: ModelRouting,
    pub yahoo_base_url: String,
    pub output_dir: String,
    pub chart_size: (u32, u32),
    pub snapshot_size: (u32, u32),
    pub range_slider: bool,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
    pub default_symbol: String,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; unset or blank values use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let basic_model = get("VISION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let advanced_model = get("VISION_MODEL_ADVANCED").unwrap_or_else(|| basic_model.clone());

        let config = Self {
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| OllamaClient::DEFAULT_HOST.to_string()),
            models: ModelRouting {
                basic: basic_model,
                advanced: advanced_model,
            },
            yahoo_base_url: get("YAHOO_BASE_URL").unwrap_or_else(|| YahooClient::DEFAULT_BASE_URL.to_string()),
            output_dir: get("CHART_OUTPUT_DIR").unwrap_or_else(|| "charts".to_string()),
            chart_size: (
                parse_or(&get, "CHART_WIDTH", 1200)?,
                parse_or(&get, "CHART_HEIGHT", 600)?,
            ),
            snapshot_size: (
                parse_or(&get, "SNAPSHOT_WIDTH", 1200)?,
                parse_or(&get, "SNAPSHOT_HEIGHT", 800)?,
            ),
            range_slider: parse_or(&get, "CHART_RANGE_SLIDER", false)?,
            retry: RetryPolicy::new(
                parse_or(&get, "ANALYSIS_MAX_ATTEMPTS", RetryPolicy::DEFAULT_MAX_ATTEMPTS)?,
                Duration::from_secs(parse_or(
                    &get,
                    "ANALYSIS_RETRY_DELAY_SECS",
                    RetryPolicy::DEFAULT_DELAY.as_secs(),
                )?),
            ),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 120)?),
            default_symbol: get("DEFAULT_SYMBOL").unwrap_or_else(|| "AAPL".to_string()).to_uppercase(),
            default_start: parse_date_or(&get, "DEFAULT_START", (2023, 1, 1))?,
            default_end: parse_date_or(&get, "DEFAULT_END", (2024, 12, 14))?,
        };

        if config.default_start >= config.default_end {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_START".to_string(),
                value: config.default_start.to_string(),
                reason: format!("must be before DEFAULT_END ({})", config.default_end),
            });
        }

        Ok(config)
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_date_or<G>(get: &G, name: &str, default: (i32, u32, u32)) -> Result<NaiveDate, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let default = NaiveDate::from_ymd_opt(default.0, default.1, default.2).unwrap_or_default();
    parse_or(get, name, default)
}
