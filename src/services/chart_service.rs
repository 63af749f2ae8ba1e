use chrono::{DateTime, Duration, NaiveDate, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::models::{ChartMetadata, ChartSpec, InteractiveChart, OverlaySeries, PriceSeries, StaticImage};
use crate::utils::TempArtifact;

const GAIN: RGBColor = RGBColor(38, 166, 154);
const LOSS: RGBColor = RGBColor(239, 83, 80);

/// Line colours, cycled in legend order
const OVERLAY_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
];

const MIN_WIDTH: u32 = 200;
const MIN_HEIGHT: u32 = 150;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid chart size {width}x{height} (minimum 200x150)")]
    InvalidSize { width: u32, height: u32 },
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Failed to read chart image: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing_err<E: std::fmt::Display>(what: &str) -> impl FnOnce(E) -> ChartError + '_ {
    move |e| ChartError::Drawing(format!("{}: {}", what, e))
}

/// Compose the candlestick series and overlays into one chart description
pub fn compose<'a>(
    series: &'a PriceSeries,
    overlays: &'a [OverlaySeries],
    metadata: ChartMetadata,
) -> ChartSpec<'a> {
    ChartSpec {
        series,
        overlays,
        metadata,
    }
}

/// Build the displayed chart and a raster snapshot of the same figure.
///
/// The snapshot goes through a temporary PNG that is gone before this returns.
pub fn build(
    series: &PriceSeries,
    overlays: &[OverlaySeries],
    metadata: ChartMetadata,
    snapshot_size: (u32, u32),
) -> Result<(InteractiveChart, StaticImage), ChartError> {
    let spec = compose(series, overlays, metadata);
    let interactive = render_interactive(&spec)?;

    let artifact = rasterize(&spec, snapshot_size.0, snapshot_size.1)?;
    let image = StaticImage {
        bytes: artifact.read()?,
        width: snapshot_size.0,
        height: snapshot_size.1,
    };

    Ok((interactive, image))
}

/// Render the chart as an SVG document at the metadata's size
pub fn render_interactive(spec: &ChartSpec) -> Result<InteractiveChart, ChartError> {
    let (width, height) = (spec.metadata.width, spec.metadata.height);
    check_size(width, height)?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_figure(&root, spec)?;
        root.present().map_err(drawing_err("Failed to render chart"))?;
    }

    Ok(InteractiveChart {
        svg,
        legend: spec.legend_labels(),
    })
}

/// Rasterize the chart to a PNG in the temp directory.
///
/// The returned artifact deletes the file when dropped; on a drawing error the
/// partial file is removed before returning.
pub fn rasterize(spec: &ChartSpec, width: u32, height: u32) -> Result<TempArtifact, ChartError> {
    check_size(width, height)?;
    let artifact = TempArtifact::reserve("chart", "png");

    {
        let root = BitMapBackend::new(artifact.path(), (width, height)).into_drawing_area();
        draw_figure(&root, spec)?;
        root.present().map_err(drawing_err("Failed to render chart"))?;
    }

    tracing::debug!("Chart rasterized to {} ({}x{})", artifact.path().display(), width, height);
    Ok(artifact)
}

fn check_size(width: u32, height: u32) -> Result<(), ChartError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(ChartError::InvalidSize { width, height });
    }
    Ok(())
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(drawing_err("Failed to fill canvas"))?;

    if spec.metadata.show_range_slider && !spec.series.is_empty() {
        let split_at = (root.dim_in_pixel().1 as f64 * 0.82) as u32;
        let (main, overview) = root.split_vertically(split_at);
        draw_main(&main, spec)?;
        draw_overview(&overview, spec.series)
    } else {
        draw_main(root, spec)
    }
}

fn draw_main<DB>(area: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let series = spec.series;
    let (x_min, x_max) = time_bounds(series);
    let (y_min, y_max) = padded(price_bounds(spec));

    let mut chart = ChartBuilder::on(area)
        .caption(&spec.metadata.title, ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(drawing_err("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
        .y_desc("Price")
        .x_desc("Date")
        .draw()
        .map_err(drawing_err("Failed to draw mesh"))?;

    let body_width = candle_width(area.dim_in_pixel().0, series.len());
    chart
        .draw_series(series.points().iter().map(|p| {
            CandleStick::new(p.timestamp, p.open, p.high, p.low, p.close, GAIN.filled(), LOSS.filled(), body_width)
        }))
        .map_err(drawing_err("Failed to draw candlesticks"))?
        .label("Candlestick")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GAIN.filled()));

    let timestamps: Vec<DateTime<Utc>> = series.points().iter().map(|p| p.timestamp).collect();
    let lines = spec.overlays.iter().flat_map(|o| o.lines.iter());

    for (idx, line) in lines.enumerate() {
        let color = OVERLAY_COLORS[idx % OVERLAY_COLORS.len()];
        let mut segments = defined_segments(&line.values);
        if segments.is_empty() {
            // keep the legend entry for a fully undefined line
            segments.push(Vec::new());
        }

        for (seg_idx, segment) in segments.into_iter().enumerate() {
            let points = segment.into_iter().map(|(i, v)| (timestamps[i], v));
            let anno = chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(drawing_err("Failed to draw indicator"))?;
            if seg_idx == 0 {
                anno.label(line.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }
        }
    }

    if spec.metadata.show_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err("Failed to draw legend"))?;
    }

    Ok(())
}

/// Close-price overview strip drawn under the main chart
fn draw_overview<DB>(area: &DrawingArea<DB, Shift>, series: &PriceSeries) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_min, x_max) = time_bounds(series);
    let closes = series.closes();
    let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = padded(Some((low, high)));

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(drawing_err("Failed to build overview"))?;

    chart
        .draw_series(
            AreaSeries::new(series.points().iter().map(|p| (p.timestamp, p.close)), y_min, BLUE.mix(0.15))
                .border_style(BLUE.mix(0.6)),
        )
        .map_err(drawing_err("Failed to draw overview"))?;

    Ok(())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// X axis range: the data span padded by half a day on each side, or the
/// requested date range when there is no data
fn time_bounds(series: &PriceSeries) -> (DateTime<Utc>, DateTime<Utc>) {
    match (series.points().first(), series.points().last()) {
        (Some(first), Some(last)) => (
            first.timestamp - Duration::hours(12),
            last.timestamp + Duration::hours(12),
        ),
        _ => {
            let start = midnight(series.start());
            let end = midnight(series.end());
            if end > start {
                (start, end)
            } else {
                (start, start + Duration::days(1))
            }
        }
    }
}

/// Lowest low and highest high across candles and defined overlay values
fn price_bounds(spec: &ChartSpec) -> Option<(f64, f64)> {
    let candle_values = spec.series.points().iter().flat_map(|p| [p.low, p.high]);
    let overlay_values = spec
        .overlays
        .iter()
        .flat_map(|o| o.lines.iter())
        .flat_map(|l| l.values.iter().filter_map(|v| *v));

    candle_values
        .chain(overlay_values)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Add 10% padding to a price range; an empty chart gets 0..1
fn padded(bounds: Option<(f64, f64)>) -> (f64, f64) {
    let Some((min_price, max_price)) = bounds else {
        return (0.0, 1.0);
    };

    let price_range = (max_price - min_price).max(max_price.abs() * 0.01).max(1e-8);
    let padding = price_range * 0.1;
    ((min_price - padding).max(0.0), max_price + padding)
}

/// Candle body width in pixels for `count` candles across `width`
fn candle_width(width: u32, count: usize) -> u32 {
    if count == 0 {
        return 1;
    }
    let plot_width = width.saturating_sub(100) as f64;
    ((plot_width / count as f64) * 0.6).clamp(1.0, 15.0) as u32
}

/// Contiguous runs of defined values as (index, value) pairs
fn defined_segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
