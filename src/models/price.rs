//! Price series models

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// One trading session of OHLCV data
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// Check the OHLC envelope and volume sign for this session
    pub fn validate(&self) -> Result<(), SeriesError> {
        let values = [self.open, self.high, self.low, self.close, self.volume];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SeriesError::NonFinite(self.timestamp));
        }
        if self.low > self.open.min(self.close) || self.high < self.open.max(self.close) {
            return Err(SeriesError::InvalidRange(self.timestamp));
        }
        if self.volume < 0.0 {
            return Err(SeriesError::NegativeVolume(self.timestamp));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("price values at {0} are not finite numbers")]
    NonFinite(DateTime<Utc>),
    #[error("low/high do not bound open/close at {0}")]
    InvalidRange(DateTime<Utc>),
    #[error("negative volume at {0}")]
    NegativeVolume(DateTime<Utc>),
    #[error("timestamps are not strictly increasing at {0}")]
    NotIncreasing(DateTime<Utc>),
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Time-ordered OHLCV observations for one symbol over a date range.
///
/// The series is immutable once built; a new fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        if start > end {
            return Err(SeriesError::InvalidDateRange { start, end });
        }

        for (i, point) in points.iter().enumerate() {
            point.validate()?;
            if i > 0 && points[i - 1].timestamp >= point.timestamp {
                return Err(SeriesError::NotIncreasing(point.timestamp));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            start,
            end,
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(day: u32, open: f64, high: f64, low: f64, close: f64, volume: f64) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_valid_series() {
        let (start, end) = dates();
        let series = PriceSeries::new(
            "AAPL",
            start,
            end,
            vec![point(1, 10.0, 12.0, 9.0, 11.0, 100.0), point(2, 11.0, 11.5, 10.0, 10.5, 0.0)],
        )
        .expect("series should be valid");

        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.closes(), vec![11.0, 10.5]);
    }

    #[test]
    fn test_rejects_low_above_close() {
        let (start, end) = dates();
        let err = PriceSeries::new("AAPL", start, end, vec![point(1, 10.0, 12.0, 10.5, 10.2, 1.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::InvalidRange(_)));
    }

    #[test]
    fn test_rejects_negative_volume() {
        let (start, end) = dates();
        let err = PriceSeries::new("AAPL", start, end, vec![point(1, 10.0, 12.0, 9.0, 11.0, -5.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::NegativeVolume(_)));
    }

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let (start, end) = dates();
        let p = point(4, 10.0, 12.0, 9.0, 11.0, 5.0);
        let err = PriceSeries::new("AAPL", start, end, vec![p.clone(), p]).unwrap_err();
        assert!(matches!(err, SeriesError::NotIncreasing(_)));
    }

    #[test]
    fn test_rejects_reversed_dates() {
        let (start, end) = dates();
        let err = PriceSeries::new("AAPL", end, start, vec![]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_empty_series_is_allowed() {
        let (start, end) = dates();
        let series = PriceSeries::new("AAPL", start, end, vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
