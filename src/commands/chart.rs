use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::AppContext;
use crate::models::{ChartMetadata, OverlaySeries, PriceSeries, SessionState};
use crate::services::{chart_service, indicator_service};
use crate::utils::{AppError, CommandError, Table};

/// `chart`: re-render the chart files for the loaded series
pub fn execute(ctx: &AppContext, state: &SessionState) -> Result<String, AppError> {
    render_current(ctx, state)
}

/// Render the loaded series with the selected overlays.
///
/// Writes `<SYMBOL>_chart.svg` for viewing and `<SYMBOL>_chart.png` next to it,
/// and returns a short summary with the latest indicator values.
pub fn render_current(ctx: &AppContext, state: &SessionState) -> Result<String, AppError> {
    let series = state.latest_series.as_ref().ok_or(CommandError::NoSeries)?;
    let overlays = indicator_service::compute_all(series, &state.selection);

    let (width, height) = ctx.config.chart_size;
    let metadata = ChartMetadata::for_symbol(series.symbol(), width, height).with_range_slider(ctx.config.range_slider);
    let (interactive, snapshot) = chart_service::build(series, &overlays, metadata, ctx.config.snapshot_size)?;

    let dir = PathBuf::from(&ctx.config.output_dir);
    fs::create_dir_all(&dir)?;
    let svg_path = dir.join(format!("{}_chart.svg", series.symbol()));
    let png_path = dir.join(format!("{}_chart.png", series.symbol()));
    fs::write(&svg_path, &interactive.svg)?;
    fs::write(&png_path, &snapshot.bytes)?;
    info!("✓ Chart written to {} ({} traces)", svg_path.display(), interactive.legend.len());

    Ok(format!(
        "🎨 Chart: {}\n   Snapshot: {} ({}x{})\n{}",
        svg_path.display(),
        png_path.display(),
        snapshot.width,
        snapshot.height,
        latest_values(series, &overlays)
    ))
}

/// Last close plus the last defined value of every overlay line
pub fn latest_values(series: &PriceSeries, overlays: &[OverlaySeries]) -> String {
    let mut table = Table::new(vec!["Series", "Last value"]);

    if let Some(last) = series.last() {
        table.add_row(&["Close".to_string(), format!("{:.2}", last.close)]);
    }
    for line in overlays.iter().flat_map(|o| o.lines.iter()) {
        let value = line
            .last_defined()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a (not enough history)".to_string());
        table.add_row(&[line.label.clone(), value]);
    }

    table.render()
}
