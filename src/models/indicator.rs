//! Indicator selection and overlay models

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;

/// Closed catalog of overlay indicators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorSpec {
    Sma { window: usize },
    Ema { span: usize },
    Bollinger { window: usize, k: f64 },
    Vwap,
}

impl IndicatorSpec {
    /// The four entries offered by default, one per indicator kind
    pub fn catalog() -> [IndicatorSpec; 4] {
        [
            IndicatorSpec::Sma { window: DEFAULT_WINDOW },
            IndicatorSpec::Ema { span: DEFAULT_WINDOW },
            IndicatorSpec::Bollinger { window: DEFAULT_WINDOW, k: DEFAULT_BOLLINGER_K },
            IndicatorSpec::Vwap,
        ]
    }

    /// Human readable catalog name, e.g. "20-Day SMA"
    pub fn display_name(&self) -> String {
        match self {
            IndicatorSpec::Sma { window } => format!("{}-Day SMA", window),
            IndicatorSpec::Ema { span } => format!("{}-Day EMA", span),
            IndicatorSpec::Bollinger { window, .. } => format!("{}-Day Bollinger Bands", window),
            IndicatorSpec::Vwap => "VWAP".to_string(),
        }
    }

    /// Shell syntax that parses back into this spec
    pub fn token(&self) -> String {
        match self {
            IndicatorSpec::Sma { window } => format!("sma:{}", window),
            IndicatorSpec::Ema { span } => format!("ema:{}", span),
            IndicatorSpec::Bollinger { window, k } => format!("bb:{}:{}", window, k),
            IndicatorSpec::Vwap => "vwap".to_string(),
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorParseError {
    #[error("unknown indicator '{0}'. Use: sma[:N], ema[:N], bb[:N[:K]], vwap")]
    Unknown(String),
    #[error("invalid window '{0}': must be a whole number of at least 1")]
    InvalidWindow(String),
    #[error("invalid band multiplier '{0}': must be a non-negative number")]
    InvalidMultiplier(String),
    #[error("too many parameters in '{0}'")]
    TooManyParams(String),
}

fn parse_window(raw: Option<&str>) -> Result<usize, IndicatorParseError> {
    match raw {
        None => Ok(DEFAULT_WINDOW),
        Some(s) => match s.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(IndicatorParseError::InvalidWindow(s.to_string())),
        },
    }
}

impl FromStr for IndicatorSpec {
    type Err = IndicatorParseError;

    /// Parse `sma[:N]`, `ema[:N]`, `bb[:N[:K]]` or `vwap` (case-insensitive)
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lowered = input.trim().to_lowercase();
        let mut parts = lowered.split(':');
        let kind = parts.next().unwrap_or_default();
        let first = parts.next();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(IndicatorParseError::TooManyParams(input.to_string()));
        }

        match kind {
            "sma" => {
                if second.is_some() {
                    return Err(IndicatorParseError::TooManyParams(input.to_string()));
                }
                Ok(IndicatorSpec::Sma { window: parse_window(first)? })
            }
            "ema" => {
                if second.is_some() {
                    return Err(IndicatorParseError::TooManyParams(input.to_string()));
                }
                Ok(IndicatorSpec::Ema { span: parse_window(first)? })
            }
            "bb" | "bollinger" => {
                let window = parse_window(first)?;
                let k = match second {
                    None => DEFAULT_BOLLINGER_K,
                    Some(s) => match s.parse::<f64>() {
                        Ok(k) if k.is_finite() && k >= 0.0 => k,
                        _ => return Err(IndicatorParseError::InvalidMultiplier(s.to_string())),
                    },
                };
                Ok(IndicatorSpec::Bollinger { window, k })
            }
            "vwap" => {
                if first.is_some() {
                    return Err(IndicatorParseError::TooManyParams(input.to_string()));
                }
                Ok(IndicatorSpec::Vwap)
            }
            _ => Err(IndicatorParseError::Unknown(input.to_string())),
        }
    }
}

/// Ordered set of selected indicators.
///
/// Duplicates are dropped on insert; the first-insertion order is kept for
/// legend ordering only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSelection {
    specs: Vec<IndicatorSpec>,
}

impl IndicatorSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the spec was already selected
    pub fn insert(&mut self, spec: IndicatorSpec) -> bool {
        if self.specs.contains(&spec) {
            return false;
        }
        self.specs.push(spec);
        true
    }

    pub fn remove(&mut self, spec: &IndicatorSpec) -> bool {
        let before = self.specs.len();
        self.specs.retain(|s| s != spec);
        before != self.specs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parse a whitespace or comma separated list of indicator tokens
    pub fn parse_list(input: &[&str]) -> Result<Self, IndicatorParseError> {
        let mut selection = Self::new();
        for token in input.iter().flat_map(|s| s.split(',')) {
            if token.trim().is_empty() {
                continue;
            }
            selection.insert(token.parse()?);
        }
        Ok(selection)
    }
}

impl FromIterator<IndicatorSpec> for IndicatorSelection {
    fn from_iter<I: IntoIterator<Item = IndicatorSpec>>(iter: I) -> Self {
        let mut selection = Self::new();
        for spec in iter {
            selection.insert(spec);
        }
        selection
    }
}

/// One named line aligned index-for-index with the price series.
/// `None` marks an undefined value.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl OverlayLine {
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Output of one indicator computation
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySeries {
    pub indicator: IndicatorSpec,
    pub lines: Vec<OverlayLine>,
}
