//! Session state threaded through every shell command

use chrono::NaiveDate;

use crate::models::analysis::{AnalysisMode, AnalysisResult};
use crate::models::indicator::{IndicatorSelection, IndicatorSpec, DEFAULT_WINDOW};
use crate::models::price::PriceSeries;

/// Latest fetched series and latest analysis, plus the user's current inputs.
///
/// Owned by the shell loop and handed to each command by `&mut`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub selection: IndicatorSelection,
    pub mode: AnalysisMode,
    pub latest_series: Option<PriceSeries>,
    pub latest_result: Option<AnalysisResult>,
}

impl SessionState {
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Self {
        let mut selection = IndicatorSelection::new();
        selection.insert(IndicatorSpec::Sma { window: DEFAULT_WINDOW });

        Self {
            symbol: symbol.to_uppercase(),
            start,
            end,
            selection,
            mode: AnalysisMode::default(),
            latest_series: None,
            latest_result: None,
        }
    }

    /// Replace the series wholesale; the previous analysis no longer applies
    pub fn replace_series(&mut self, series: PriceSeries) {
        self.latest_series = Some(series);
        self.latest_result = None;
    }

    pub fn record_result(&mut self, result: AnalysisResult) {
        self.latest_result = Some(result);
    }
}
