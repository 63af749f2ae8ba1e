pub mod help;
pub mod fetch;
pub mod indicators;
pub mod mode;
pub mod chart;
pub mod analyze;
pub mod status;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::{ModelClient, PriceProvider};
use crate::config::AppConfig;
use crate::models::SessionState;
use crate::utils::{AppError, CommandError};

/// Long-lived collaborators shared by every command
pub struct AppContext {
    pub config: AppConfig,
    pub provider: Box<dyn PriceProvider>,
    pub model_client: Box<dyn ModelClient>,
}

/// What the shell should do after a line has been handled
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
    Ignored,
}

/// Parse and run one shell line against the session.
///
/// Command failures are logged and turned into a reply; they never end the
/// session.
pub async fn handle_line(ctx: &AppContext, state: &mut SessionState, line: &str) -> Outcome {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Outcome::Ignored;
    }

    let command = parts[0].to_lowercase();
    let args = &parts[1..];
    debug!("Command '{}' with args {:?}", command, args);

    let result = match command.as_str() {
        "help" | "?" => Ok(help::execute()),
        "fetch" | "load" => fetch::execute(ctx, state, args).await,
        "indicators" | "ind" => indicators::execute(ctx, state, args),
        "mode" => mode::execute(ctx, state, args),
        "chart" => chart::execute(ctx, state),
        "analyze" | "analyse" => analyze::execute(ctx, state).await,
        "status" => Ok(status::execute(state)),
        "quit" | "exit" => return Outcome::Quit,
        other => Err(CommandError::Usage(format!("unknown command '{}'. Type `help` for the list", other)).into()),
    };

    match result {
        Ok(reply) => Outcome::Reply(reply),
        Err(e) => {
            warn!("❌ Error executing command {}: {}", command, e);
            Outcome::Reply(e.user_message())
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CommandError::InvalidDate(raw.to_string()).into())
}


#[cfg(test)]
mod tests {
    use super::test_support::{context, session};
    use super::*;

    #[tokio::test]
    async fn test_blank_line_ignored() {
        let ctx = context(None);
        let mut state = session(&ctx);
        assert_eq!(handle_line(&ctx, &mut state, "   ").await, Outcome::Ignored);
    }

    #[tokio::test]
    async fn test_quit() {
        let ctx = context(None);
        let mut state = session(&ctx);
        assert_eq!(handle_line(&ctx, &mut state, "EXIT").await, Outcome::Quit);
    }

    #[tokio::test]
    async fn test_unknown_command_replies_with_error() {
        let ctx = context(None);
        let mut state = session(&ctx);
        let Outcome::Reply(reply) = handle_line(&ctx, &mut state, "buy AAPL").await else {
            panic!("expected a reply");
        };
        assert!(reply.starts_with("❌"));
        assert!(reply.contains("unknown command 'buy'"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_date("02/29/2024").is_err());
    }
}
