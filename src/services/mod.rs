pub mod market_service;
pub mod indicator_service;
pub mod chart_service;
pub mod analysis_service;
