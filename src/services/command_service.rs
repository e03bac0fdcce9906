//! Chat command table: parses the command word and routes it to the right service.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    error::ServiceError,
    services::{egg_service, leaderboard_service, ping_service, shot_service},
    state::game::Game,
};

const HELP_TEXT: &str =
    "Commands: !shoot, !score, !pigeons, !bef, !help, !level, !top5, !top10, !topN, !eggs, !ping";
const BEF_TEXT: &str = "~ coo coo ~ cannot be frens with a rat of the sky ~";
const DEFAULT_TOP: i64 = 5;
const MAX_TOP: i64 = 10;

/// Commands understood by a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Shoot,
    Points,
    Pigeons,
    Bef,
    Help,
    Level,
    Top(i64),
    Eggs,
    Ping,
}

impl Command {
    /// Parse a command word such as `!shoot` or `!top7`. `None` for anything else.
    pub fn parse(word: &str) -> Option<Self> {
        let name = word.trim().strip_prefix('!')?.to_ascii_lowercase();
        let command = match name.as_str() {
            "shoot" => Self::Shoot,
            "score" | "points" => Self::Points,
            "pigeons" => Self::Pigeons,
            "bef" => Self::Bef,
            "help" => Self::Help,
            "level" => Self::Level,
            "eggs" => Self::Eggs,
            "ping" => Self::Ping,
            other => {
                let suffix = other.strip_prefix("top")?;
                Self::Top(top_size(suffix)?)
            }
        };
        Some(command)
    }
}

/// `!top` suffix to a leaderboard size: empty or below 1 means 5, above 10 is capped.
fn top_size(suffix: &str) -> Option<i64> {
    if suffix.is_empty() {
        return Some(DEFAULT_TOP);
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // digit strings too long for i64 are still "large"
    let size = suffix.parse::<i64>().unwrap_or(MAX_TOP);
    Some(match size {
        n if n < 1 => DEFAULT_TOP,
        n => n.min(MAX_TOP),
    })
}

/// Run `command` for `caller`. `Ok(false)` when the command is not one of ours.
///
/// Extra arguments are accepted and ignored by every current command.
pub async fn dispatch(
    game: &Arc<Game>,
    caller: &str,
    command: &str,
    args: &[String],
) -> Result<bool, ServiceError> {
    let Some(parsed) = Command::parse(command) else {
        debug!(scope = %game.scope(), command, "ignoring unknown command");
        return Ok(false);
    };
    debug!(scope = %game.scope(), caller, ?parsed, extra_args = args.len(), "dispatching command");

    match parsed {
        Command::Shoot => {
            shot_service::shoot(game, caller).await?;
        }
        Command::Points => leaderboard_service::announce_points(game).await,
        Command::Pigeons => leaderboard_service::announce_counts(game).await,
        Command::Level => leaderboard_service::announce_levels(game).await,
        Command::Bef => game.say(BEF_TEXT),
        Command::Help => game.say(HELP_TEXT),
        Command::Top(limit) => leaderboard_service::announce_top(game, limit).await?,
        Command::Eggs => match egg_service::egg_balance(game, caller).await {
            Ok(line) => game.say(&line),
            Err(err) => {
                warn!(scope = %game.scope(), caller, error = %err, "failed to read egg balance");
                game.say(&format!("{caller}: your eggs could not be counted right now."));
                return Err(err.into());
            }
        },
        Command::Ping => {
            ping_service::start_ping(game, caller);
        }
    }
    Ok(true)
}
