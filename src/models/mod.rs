//! Data models for the dashboard
//!
//! Price data, indicator selections and overlays, chart compositions and
//! analysis requests/results. Each service accepts and returns these types.

pub mod price;
pub mod indicator;
pub mod chart;
pub mod analysis;
pub mod session;

// Re-export commonly used types for convenience
pub use price::{PricePoint, PriceSeries, SeriesError};
pub use indicator::{IndicatorSelection, IndicatorSpec, OverlayLine, OverlaySeries};
pub use chart::{ChartMetadata, ChartSpec, InteractiveChart, StaticImage};
pub use analysis::{AnalysisMode, AnalysisRequest, AnalysisResult, ModelRouting};
pub use session::SessionState;
