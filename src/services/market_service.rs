use chrono::NaiveDate;
use tracing::info;

use crate::api::{PriceProvider, ProviderError};
use crate::models::PriceSeries;

/// Normalize a user-entered ticker: trimmed and upper-cased
pub fn normalize_symbol(raw: &str) -> Result<String, ProviderError> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(ProviderError::Validation("Symbol cannot be empty".to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ProviderError::Validation(format!("Invalid symbol '{}'", symbol)));
    }

    Ok(symbol)
}

/// Fetch a fresh series for `symbol` over `[start, end)`.
///
/// Validation happens before any request goes out. An empty answer is
/// `ProviderError::NoData`.
pub async fn fetch_series(
    provider: &dyn PriceProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, ProviderError> {
    let symbol = normalize_symbol(symbol)?;

    if start >= end {
        return Err(ProviderError::Validation(format!(
            "Start date {} must be before end date {}",
            start, end
        )));
    }

    info!("📈 Fetching {} from {} to {}", symbol, start, end);
    let series = provider.fetch(&symbol, start, end).await?;

    if series.is_empty() {
        return Err(ProviderError::NoData { symbol, start, end });
    }

    info!("✓ Loaded {} sessions for {}", series.len(), symbol);
    Ok(series)
}
