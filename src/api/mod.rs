//! Clients for the two external collaborators: the price data provider and
//! the vision model server.

pub mod errors;
pub mod ollama;
pub mod yahoo;

pub use errors::{ModelError, ProviderError};
pub use ollama::OllamaClient;
pub use yahoo::YahooClient;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{AnalysisRequest, PriceSeries};

/// Source of historical daily OHLCV series
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch daily bars for `symbol` from `start` (inclusive) to `end` (exclusive).
    ///
    /// An empty result is reported as [`ProviderError::NoData`], never as an
    /// empty series.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError>;
}

/// Chat-completion endpoint of a vision-capable model server
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Names of the models the server has available
    async fn list_models(&self) -> Result<Vec<String>, ModelError>;

    /// Send one request and return the raw text content of the reply
    async fn chat(&self, request: &AnalysisRequest) -> Result<String, ModelError>;
}
