use chrono::NaiveDate;
use thiserror::Error;

use crate::models::SeriesError;

/// Errors from a price series provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered, but has nothing for this symbol and range
    #[error("No price data found for '{symbol}' between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// The provider reported an error in its response body
    #[error("Provider error: {0}")]
    Api(String),
    /// Non-success HTTP status
    #[error("HTTP Error ({0}): {1}")]
    Http(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
    /// Request parameters rejected before calling out
    #[error("Invalid request: {0}")]
    Validation(String),
    /// Rows came back but do not form a valid series
    #[error("Invalid price data: {0}")]
    InvalidData(#[from] SeriesError),
}

/// Errors from the model-serving endpoint
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 404, usually a model that has not been pulled
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error, including an unreachable host
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}
