use std::sync::Arc;

use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};
use tracing::info;

use crate::state::game::Game;

/// Drive the spawn ticks of `game` until `shutdown` flips to `true`.
///
/// Loads the roster first. Shutdown is observed between ticks, never mid-tick.
pub async fn run(game: Arc<Game>, mut shutdown: watch::Receiver<bool>) {
    game.sync_from_storage().await;

    let period = game.config().spawn_interval();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(scope = %game.scope(), period_secs = period.as_secs(), "spawn loop started");

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                game.tick().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!(scope = %game.scope(), "spawn loop stopped");
}
