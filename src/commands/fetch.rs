use tracing::{info, warn};

use super::{chart, parse_date, AppContext};
use crate::models::SessionState;
use crate::services::market_service;
use crate::utils::{AppError, CommandError};

/// `fetch [SYMBOL] [START] [END]`
///
/// Arguments that are given replace the session's inputs, but only once the
/// fetch succeeds. A failed fetch leaves the session untouched.
pub async fn execute(ctx: &AppContext, state: &mut SessionState, args: &[&str]) -> Result<String, AppError> {
    if args.len() > 3 {
        return Err(CommandError::Usage("fetch [SYMBOL] [START] [END]".to_string()).into());
    }

    let symbol = match args.first() {
        Some(raw) => market_service::normalize_symbol(raw)?,
        None => state.symbol.clone(),
    };
    let start = match args.get(1) {
        Some(raw) => parse_date(raw)?,
        None => state.start,
    };
    let end = match args.get(2) {
        Some(raw) => parse_date(raw)?,
        None => state.end,
    };

    let series = market_service::fetch_series(ctx.provider.as_ref(), &symbol, start, end).await?;

    let first = series.points().first().map(|p| p.timestamp.date_naive());
    let last = series.points().last().map(|p| p.timestamp.date_naive());
    let mut reply = format!(
        "✅ Stock data loaded successfully! {} sessions of {}",
        series.len(),
        series.symbol()
    );
    if let (Some(first), Some(last)) = (first, last) {
        reply.push_str(&format!(" ({} to {})", first, last));
    }

    state.symbol = symbol;
    state.start = start;
    state.end = end;
    state.replace_series(series);

    // The data stays loaded even if drawing fails
    match chart::render_current(ctx, state) {
        Ok(summary) => {
            reply.push('\n');
            reply.push_str(&summary);
        }
        Err(e) => {
            warn!("Chart rendering failed after fetch: {}", e);
            reply.push('\n');
            reply.push_str(&e.user_message());
        }
    }

    info!("Fetch complete for {}", state.symbol);
    Ok(reply)
}
