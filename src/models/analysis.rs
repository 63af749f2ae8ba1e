//! Chart analysis models

use std::fmt;
use std::str::FromStr;

const BASIC_PROMPT: &str = "You are a Stock Trader specializing in Technical Analysis at a top financial institution.
Analyze the stock chart's technical indicators and provide a buy/hold/sell recommendation.
Base your recommendation only on the candlestick chart and the displayed technical indicators.
First, provide the recommendation, then, provide your detailed reasoning.
Be concise but thorough in your analysis.";

const ADVANCED_PATTERN_PROMPT: &str = "You are a senior Technical Analyst at a top financial institution.
Study the candlestick chart and every displayed technical indicator.
Identify notable candlestick formations and chart patterns (trend channels, head and shoulders, double tops or bottoms, flags, wedges).
Mark the key support and resistance levels you can read from the chart, and state where the indicators confirm or contradict the price action.
Finish with a buy/hold/sell recommendation.
First, provide the recommendation, then, provide your detailed reasoning.
Base everything only on what is visible in the chart.";

/// Prompt framing used for an analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    Basic,
    AdvancedPattern,
}

impl AnalysisMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            AnalysisMode::Basic => BASIC_PROMPT,
            AnalysisMode::AdvancedPattern => ADVANCED_PATTERN_PROMPT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Basic => "basic",
            AnalysisMode::AdvancedPattern => "advanced",
        }
    }

    pub fn all() -> [AnalysisMode; 2] {
        [AnalysisMode::Basic, AnalysisMode::AdvancedPattern]
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(AnalysisMode::Basic),
            "advanced" | "advanced-pattern" | "pattern" => Ok(AnalysisMode::AdvancedPattern),
            other => Err(format!("Unknown analysis mode '{}'. Use: basic, advanced", other)),
        }
    }
}

/// Explicit mode to model-name mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRouting {
    pub basic: String,
    pub advanced: String,
}

impl ModelRouting {
    pub fn single(model: &str) -> Self {
        Self {
            basic: model.to_string(),
            advanced: model.to_string(),
        }
    }

    pub fn model_for(&self, mode: AnalysisMode) -> &str {
        match mode {
            AnalysisMode::Basic => &self.basic,
            AnalysisMode::AdvancedPattern => &self.advanced,
        }
    }

    /// Distinct model names, for the start-up catalog check
    pub fn distinct_models(&self) -> Vec<&str> {
        let mut models = vec![self.basic.as_str()];
        if self.advanced != self.basic {
            models.push(self.advanced.as_str());
        }
        models
    }
}

/// Everything sent to the model for one analysis call
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub model: String,
    pub prompt_text: String,
    pub encoded_image: String,
}

/// Outcome of the latest analysis action
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Completed { model: String, content: String },
    Failed { error: String },
}
