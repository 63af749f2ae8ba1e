use tracing::{error, info};

use super::AppContext;
use crate::models::{AnalysisResult, ChartMetadata, SessionState};
use crate::services::{analysis_service, chart_service, indicator_service};
use crate::utils::{AppError, CommandError, TempArtifact};

/// `analyze`: send a snapshot of the current chart to the vision model
pub async fn execute(ctx: &AppContext, state: &mut SessionState) -> Result<String, AppError> {
    let series = state.latest_series.as_ref().ok_or(CommandError::NoSeries)?;
    let overlays = indicator_service::compute_all(series, &state.selection);

    let (width, height) = ctx.config.snapshot_size;
    let metadata = ChartMetadata::for_symbol(series.symbol(), width, height).with_range_slider(ctx.config.range_slider);
    let spec = chart_service::compose(series, &overlays, metadata);
    let snapshot = chart_service::rasterize(&spec, width, height)?;

    info!(
        "🔍 Analyzing {} chart ({} overlay lines) in {} mode",
        series.symbol(),
        spec.line_trace_count(),
        state.mode
    );
    run(ctx, state, snapshot).await
}

/// Hand the snapshot to the model and record the outcome on the session
async fn run(ctx: &AppContext, state: &mut SessionState, snapshot: TempArtifact) -> Result<String, AppError> {
    let model = ctx.config.models.model_for(state.mode).to_string();
    let outcome = analysis_service::analyze_snapshot(
        ctx.model_client.as_ref(),
        snapshot,
        state.mode,
        &ctx.config.models,
        &ctx.config.retry,
    )
    .await;

    match outcome {
        Ok(content) => {
            let reply = format!("**AI Analysis Results:**\n{}", content);
            state.record_result(AnalysisResult::Completed { model, content });
            Ok(reply)
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            state.record_result(AnalysisResult::Failed { error: e.to_string() });
            Err(e.into())
        }
    }
}
