use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::ChartResponse;
use crate::api::{PriceProvider, ProviderError};
use crate::models::{PricePoint, PriceSeries};

/// Yahoo Finance chart API client for daily OHLCV history
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";
    const BROWSER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    /// Create a new client with custom base URL (for testing or a proxy)
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        // Yahoo rejects requests without a browser-like agent
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::BROWSER_AGENT));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    /// Query parameters for a daily range; `end` is exclusive
    fn query_params(start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("period1", midnight_timestamp(start).to_string()),
            ("period2", midnight_timestamp(end).to_string()),
            ("interval", "1d".to_string()),
            ("includePrePost", "false".to_string()),
        ]
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProviderError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        // Unknown or delisted symbols come back as 404 with an embedded error
        if status_code == 404 {
            debug!("Provider has no data for {}: {}", symbol, body_text);
            return ProviderError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            };
        }

        let message = serde_json::from_str::<ChartResponse>(&body_text)
            .ok()
            .and_then(|r| r.chart)
            .and_then(|c| c.error)
            .map(|e| e.message())
            .unwrap_or(body_text);

        warn!("Price provider returned {}: {}", status_code, message);
        ProviderError::Http(status_code, message)
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        let url = self.chart_url(symbol);
        debug!("GET {} ({} to {})", url, start, end);

        let response = self
            .http_client
            .get(&url)
            .query(&Self::query_params(start, end))
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response, symbol, start, end).await);
        }

        let body = response
            .json::<ChartResponse>()
            .await
            .map_err(|e| ProviderError::Deserialization(format!("Failed to parse response: {}", e)))?;

        series_from_response(symbol, start, end, body)
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Convert a chart response into a validated series.
///
/// Rows with a missing price or an inconsistent OHLC envelope are skipped.
/// Missing volume counts as zero. Rows are sorted, and for duplicate
/// timestamps the later row wins.
pub fn series_from_response(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    body: ChartResponse,
) -> Result<PriceSeries, ProviderError> {
    let no_data = || ProviderError::NoData {
        symbol: symbol.to_string(),
        start,
        end,
    };

    let chart = body.chart.ok_or_else(no_data)?;
    if let Some(error) = chart.error {
        return Err(ProviderError::Api(error.message()));
    }

    let Some(result) = chart.result.and_then(|mut r| r.pop()) else {
        return Err(no_data());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| q.pop())
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (idx, ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            quote.open_value(idx),
            quote.high_value(idx),
            quote.low_value(idx),
            quote.close_value(idx),
        ) else {
            skipped += 1;
            continue;
        };

        let Some(timestamp) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            skipped += 1;
            continue;
        };

        let point = PricePoint {
            timestamp,
            open,
            high,
            low,
            close,
            volume: quote.volume_value(idx).unwrap_or(0.0),
        };

        if let Err(e) = point.validate() {
            warn!("Skipping inconsistent row for {}: {}", symbol, e);
            skipped += 1;
            continue;
        }

        points.push(point);
    }

    if skipped > 0 {
        debug!("Skipped {} incomplete row(s) for {}", skipped, symbol);
    }

    points.sort_by_key(|p| p.timestamp);
    // keep the last row of each timestamp
    points.reverse();
    points.dedup_by_key(|p| p.timestamp);
    points.reverse();

    if points.is_empty() {
        return Err(no_data());
    }

    Ok(PriceSeries::new(symbol, start, end, points)?)
}
