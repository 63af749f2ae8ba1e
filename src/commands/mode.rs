use super::AppContext;
use crate::models::{AnalysisMode, SessionState};
use crate::utils::{AppError, CommandError};

/// `mode [basic|advanced]`: show or switch the analysis mode
pub fn execute(ctx: &AppContext, state: &mut SessionState, args: &[&str]) -> Result<String, AppError> {
    match args {
        [] => {
            let options = AnalysisMode::all()
                .iter()
                .map(|m| format!("  {:<9} → {}", m.label(), ctx.config.models.model_for(*m)))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(format!("🔍 Analysis mode: {}\n{}", state.mode, options))
        }
        [raw] => {
            let mode: AnalysisMode = raw.parse().map_err(CommandError::Invalid)?;
            state.mode = mode;
            Ok(format!(
                "🔍 Analysis mode set to {} (model {})",
                mode,
                ctx.config.models.model_for(mode)
            ))
        }
        _ => Err(CommandError::Usage("mode [basic|advanced]".to_string()).into()),
    }
}
