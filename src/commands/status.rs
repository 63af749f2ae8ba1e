use crate::models::{AnalysisResult, SessionState};
use crate::services::indicator_service;

use super::chart::latest_values;

/// `status`: the session's inputs, loaded data and latest analysis
pub fn execute(state: &SessionState) -> String {
    let selected = if state.selection.is_empty() {
        "(none)".to_string()
    } else {
        state
            .selection
            .iter()
            .map(|s| s.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        format!("**Symbol:** {}", state.symbol),
        format!("**Range:** {} to {}", state.start, state.end),
        format!("**Indicators:** {}", selected),
        format!("**Mode:** {}", state.mode),
    ];

    match &state.latest_series {
        Some(series) => {
            lines.push(format!(
                "**Loaded:** {} sessions of {} ({} to {})",
                series.len(),
                series.symbol(),
                series.start(),
                series.end()
            ));
            let overlays = indicator_service::compute_all(series, &state.selection);
            lines.push(latest_values(series, &overlays));
        }
        None => lines.push("**Loaded:** nothing yet, run `fetch`".to_string()),
    }

    lines.push(match &state.latest_result {
        Some(AnalysisResult::Completed { model, .. }) => format!("**Last analysis:** completed by {}", model),
        Some(AnalysisResult::Failed { error }) => format!("**Last analysis:** failed ({})", error),
        None => "**Last analysis:** none".to_string(),
    });

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::fixtures::constant_series;
    use chrono::NaiveDate;

    fn state() -> SessionState {
        SessionState::new(
            "msft",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_empty_session() {
        let text = execute(&state());
        assert!(text.contains("**Symbol:** MSFT"));
        assert!(text.contains("nothing yet"));
        assert!(text.contains("**Last analysis:** none"));
    }

    #[test]
    fn test_loaded_session_shows_values() {
        let mut state = state();
        state.replace_series(constant_series(30, 50.0, 10.0));
        state.record_result(AnalysisResult::Failed {
            error: "timeout".to_string(),
        });

        let text = execute(&state);
        assert!(text.contains("30 sessions"));
        assert!(text.contains("SMA (20) | 50.00"));
        assert!(text.contains("failed (timeout)"));
    }
}
