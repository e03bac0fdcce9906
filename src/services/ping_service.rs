//! `!ping`: a direct-message latency check answered through the pings route.

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, sleep};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::game::{Game, PendingPing},
};

/// Send a CTCP PING to `caller` and arm its timeout. Returns the token.
pub fn start_ping(game: &Arc<Game>, caller: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    game.pings().insert(
        token.clone(),
        PendingPing {
            nick: caller.to_owned(),
            started: Instant::now(),
        },
    );
    game.whisper(caller, &format!("\u{1}PING {token}\u{1}"));

    let timeout = game.config().ping_timeout();
    let game = Arc::clone(game);
    let pending_token = token.clone();
    tokio::spawn(async move {
        sleep(timeout).await;
        if let Some((_, ping)) = game.pings().remove(&pending_token) {
            debug!(scope = %game.scope(), nick = %ping.nick, "ping timed out");
            game.say(&format!("{}: Pong (timeout)", ping.nick));
        }
    });

    token
}

/// Length of a token minted by [`start_ping`].
const TOKEN_LEN: usize = 32;

/// Resolve the ping identified by `token`, announcing the round-trip time.
///
/// Strings that cannot be a minted token are refused as invalid input.
pub fn answer_ping(game: &Game, token: &str) -> Result<Duration, ServiceError> {
    if token.len() != TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ServiceError::InvalidInput(format!(
            "`{token}` is not a ping token"
        )));
    }
    let (_, ping) = game
        .pings()
        .remove(token)
        .ok_or_else(|| ServiceError::NotFound(format!("no pending ping `{token}`")))?;
    let elapsed = ping.started.elapsed();
    game.say(&format!("{}: Pong ({:.3}s)", ping.nick, elapsed.as_secs_f64()));
    Ok(elapsed)
}
