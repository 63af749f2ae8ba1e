use tracing::{info, warn};

use super::{chart, AppContext};
use crate::models::{IndicatorSelection, IndicatorSpec, SessionState};
use crate::utils::{AppError, CommandError};

/// `indicators [add|remove|clear] [TOKENS...]`
///
/// With no arguments, lists the catalog and the current selection. A bare list
/// of tokens replaces the selection.
pub fn execute(ctx: &AppContext, state: &mut SessionState, args: &[&str]) -> Result<String, AppError> {
    let Some((&first, rest)) = args.split_first() else {
        return Ok(describe(&state.selection));
    };

    let message = match first.to_lowercase().as_str() {
        "add" => {
            let specs = parse_tokens(rest)?;
            let added = specs.iter().filter(|spec| state.selection.insert(**spec)).count();
            format!("➕ Added {} indicator(s)", added)
        }
        "remove" | "rm" => {
            let specs = parse_tokens(rest)?;
            let removed = specs.iter().filter(|spec| state.selection.remove(spec)).count();
            format!("➖ Removed {} indicator(s)", removed)
        }
        "clear" | "none" => {
            state.selection = IndicatorSelection::new();
            "Cleared all indicators".to_string()
        }
        _ => {
            state.selection = IndicatorSelection::parse_list(args).map_err(CommandError::from)?;
            "Indicator selection replaced".to_string()
        }
    };
    info!("Indicator selection now {}", selection_line(&state.selection));

    let mut reply = format!("{}\n{}", message, describe(&state.selection));
    if state.latest_series.is_some() {
        match chart::render_current(ctx, state) {
            Ok(summary) => {
                reply.push('\n');
                reply.push_str(&summary);
            }
            Err(e) => {
                warn!("Chart re-render failed: {}", e);
                reply.push('\n');
                reply.push_str(&e.user_message());
            }
        }
    }

    Ok(reply)
}

fn parse_tokens(tokens: &[&str]) -> Result<Vec<IndicatorSpec>, AppError> {
    if tokens.is_empty() {
        return Err(CommandError::Usage("indicators add|remove sma[:N] ema[:N] bb[:N[:K]] vwap".to_string()).into());
    }
    let selection = IndicatorSelection::parse_list(tokens).map_err(CommandError::from)?;
    Ok(selection.iter().copied().collect())
}

fn selection_line(selection: &IndicatorSelection) -> String {
    if selection.is_empty() {
        return "(none)".to_string();
    }
    selection.iter().map(|s| s.display_name()).collect::<Vec<_>>().join(", ")
}

fn describe(selection: &IndicatorSelection) -> String {
    let catalog = IndicatorSpec::catalog()
        .iter()
        .map(|spec| format!("  {:<8} {}", spec.token(), spec.display_name()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📊 Selected: {}\nAvailable (window/span/k can be changed, e.g. sma:50, bb:20:2.5):\n{}",
        selection_line(selection),
        catalog
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, session};

    #[test]
    fn test_listing_shows_selection_and_catalog() {
        let ctx = context(None);
        let mut state = session(&ctx);

        let reply = execute(&ctx, &mut state, &[]).unwrap();
        assert!(reply.contains("Selected: 20-Day SMA"));
        assert!(reply.contains("20-Day Bollinger Bands"));
        assert!(reply.contains("vwap"));
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let ctx = context(None);
        let mut state = session(&ctx);

        let reply = execute(&ctx, &mut state, &["add", "sma", "vwap", "vwap"]).unwrap();
        assert!(reply.starts_with("➕ Added 1 indicator(s)"));
        assert_eq!(state.selection.len(), 2);
    }

    #[test]
    fn test_replace_and_clear() {
        let ctx = context(None);
        let mut state = session(&ctx);

        execute(&ctx, &mut state, &["ema:10,bb"]).unwrap();
        let specs: Vec<IndicatorSpec> = state.selection.iter().copied().collect();
        assert_eq!(
            specs,
            vec![
                IndicatorSpec::Ema { span: 10 },
                IndicatorSpec::Bollinger { window: 20, k: 2.0 }
            ]
        );

        execute(&ctx, &mut state, &["clear"]).unwrap();
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_remove_unselected_is_noop() {
        let ctx = context(None);
        let mut state = session(&ctx);

        let reply = execute(&ctx, &mut state, &["remove", "vwap"]).unwrap();
        assert!(reply.starts_with("➖ Removed 0 indicator(s)"));
        assert_eq!(state.selection.len(), 1);
    }

    #[test]
    fn test_unknown_token_leaves_selection_alone() {
        let ctx = context(None);
        let mut state = session(&ctx);

        let err = execute(&ctx, &mut state, &["macd"]).unwrap_err();
        assert!(matches!(err, AppError::Command(CommandError::Indicator(_))));
        assert_eq!(state.selection.len(), 1);
    }
}
