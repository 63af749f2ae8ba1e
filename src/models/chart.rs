//! Chart composition models

use crate::models::indicator::OverlaySeries;
use crate::models::price::PriceSeries;

/// Display metadata for a composed chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMetadata {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub show_range_slider: bool,
    pub show_legend: bool,
}

impl ChartMetadata {
    /// Default dashboard layout: "<SYMBOL> Stock Price with Technical Indicators"
    pub fn for_symbol(symbol: &str, width: u32, height: u32) -> Self {
        Self {
            title: format!("{} Stock Price with Technical Indicators", symbol),
            width,
            height,
            show_range_slider: false,
            show_legend: true,
        }
    }

    /// Toggle the close-price overview strip under the main chart
    pub fn with_range_slider(mut self, show: bool) -> Self {
        self.show_range_slider = show;
        self
    }
}

/// Candlesticks plus overlay line traces, built fresh for every render
#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub series: &'a PriceSeries,
    pub overlays: &'a [OverlaySeries],
    pub metadata: ChartMetadata,
}

impl<'a> ChartSpec<'a> {
    /// Number of line traces drawn on top of the candlesticks
    pub fn line_trace_count(&self) -> usize {
        self.overlays.iter().map(|o| o.lines.len()).sum()
    }

    /// Legend labels in drawing order; the candlestick trace comes first
    pub fn legend_labels(&self) -> Vec<String> {
        std::iter::once("Candlestick".to_string())
            .chain(
                self.overlays
                    .iter()
                    .flat_map(|o| o.lines.iter().map(|l| l.label.clone())),
            )
            .collect()
    }
}

/// SVG document shown to the user
#[derive(Debug, Clone)]
pub struct InteractiveChart {
    pub svg: String,
    pub legend: Vec<String>,
}

/// PNG bytes used only for transport to the model
#[derive(Debug, Clone)]
pub struct StaticImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
