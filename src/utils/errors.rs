use thiserror::Error;

use crate::api::{ModelError, ProviderError};
use crate::config::ConfigError;
use crate::models::indicator::IndicatorParseError;
use crate::services::analysis_service::AnalysisError;
use crate::services::chart_service::ChartError;

/// Bad arguments or a command that needs state the session does not have yet
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("No data loaded. Run `fetch` first")]
    NoSeries,
    #[error(transparent)]
    Indicator(#[from] IndicatorParseError),
    #[error("{0}")]
    Invalid(String),
}

/// Every failure a shell command can surface to the user
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short message shown in the shell
    pub fn user_message(&self) -> String {
        match self {
            AppError::Provider(ProviderError::NoData { symbol, start, end }) => format!(
                "❌ No data found for {} between {} and {}. Check the symbol and date range.",
                symbol, start, end
            ),
            AppError::Provider(ProviderError::Request(_)) => {
                "⚠️ **Network Error**: Could not reach the price data provider. Please try again.".to_string()
            }
            AppError::Provider(e) => format!("❌ Error fetching stock data: {}", e),
            AppError::Analysis(e) => format!("❌ Error during AI analysis: {}", e),
            AppError::Model(e) => format!("❌ Model server error: {}", e),
            AppError::Chart(e) => format!("❌ {}", e),
            AppError::Config(e) => format!("❌ Configuration error: {}", e),
            AppError::Command(e) => format!("❌ {}", e),
            AppError::Io(e) => format!("❌ {}", e),
        }
    }
}
