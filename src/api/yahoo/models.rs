use serde::{Deserialize, Serialize};

/// Top level of the v8 chart endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: Option<ChartBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// Error object embedded in the response, e.g. for unknown symbols
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Option<ChartIndicators>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartIndicators {
    pub quote: Option<Vec<Quote>>,
}

/// Column-oriented OHLCV arrays; any cell may be null
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<f64>>>,
}

impl Quote {
    fn value_at(values: &Option<Vec<Option<f64>>>, idx: usize) -> Option<f64> {
        values.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }

    pub fn open_value(&self, idx: usize) -> Option<f64> {
        Self::value_at(&self.open, idx)
    }

    pub fn high_value(&self, idx: usize) -> Option<f64> {
        Self::value_at(&self.high, idx)
    }

    pub fn low_value(&self, idx: usize) -> Option<f64> {
        Self::value_at(&self.low, idx)
    }

    pub fn close_value(&self, idx: usize) -> Option<f64> {
        Self::value_at(&self.close, idx)
    }

    pub fn volume_value(&self, idx: usize) -> Option<f64> {
        Self::value_at(&self.volume, idx)
    }
}

impl ChartError {
    pub fn message(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (None, Some(desc)) => desc.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}
