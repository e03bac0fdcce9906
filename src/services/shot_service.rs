//! `!shoot` end to end: cooldown, target check, roll, scoring, eggs, persistence.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    config::SaveMode,
    dao::storage::StorageError,
    error::ServiceError,
    services::{egg_service, format::group_thousands},
    state::{
        cooldown::Admission,
        game::Game,
        roster::{PlayerRegistry, canonical_name},
    },
};

/// What happened to a shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Attempt budget spent; try again after `wait`.
    CoolingDown { wait: Duration },
    /// Nothing to shoot at.
    NoTarget,
    /// The pigeon went down.
    Hit { points: i64, count: i64 },
    /// The pigeon is still there.
    Missed,
}

/// Resolve a shot by `caller`, the nick as typed in chat.
///
/// Policy denials return `Ok`; storage failures are reported in chat and returned.
pub async fn shoot(game: &Game, caller: &str) -> Result<ShotOutcome, ServiceError> {
    let name = canonical_name(caller);

    let spawn_id = game.spawner().current_spawn_id();
    let admission = game
        .cooldowns()
        .try_consume(&name, spawn_id, Instant::now());
    if let Admission::Denied { wait } = admission {
        game.say(&format!(
            "...{caller} slow down... you can shoot again in {:.1} seconds",
            wait.as_secs_f64()
        ));
        return Ok(ShotOutcome::CoolingDown { wait });
    }

    let mut roster = game.roster().await;
    let mut slot = game.target().await;

    let Some(target) = slot.active().copied() else {
        game.say(&format!(
            "{caller} has shot at a pigeon, but there are no pigeons to shoot!"
        ));
        return Ok(ShotOutcome::NoTarget);
    };

    let player = match game.find_player(&mut roster, caller).await {
        Ok(player) => player,
        Err(err) => {
            warn!(scope = %game.scope(), player = %name, error = %err, "failed to register shooter");
            game.say(&format!(
                "{caller} has shot a pigeon, but there was an error finding the player!"
            ));
            return Err(err.into());
        }
    };

    if !game.dice().chance(target.species.success_rate) {
        game.say(&format!("{caller} has shot a pigeon, but it got away!"));
        persist(game, &roster, &name).await?;
        return Ok(ShotOutcome::Missed);
    }

    player.points += target.species.points;
    player.count += 1;
    game.say(&format!(
        "{caller} has shot a pigeon! You have shot a total of {} pigeon(s) and now have {} points. Level: {}",
        group_thousands(player.count),
        group_thousands(player.points),
        game.level_for(player.count)
    ));

    let mut egg_error: Option<StorageError> = None;
    match egg_service::collect_mating_eggs(game, &target, caller).await {
        Ok(Some(message)) => game.say(&message),
        Ok(None) => {}
        Err(err) => {
            warn!(scope = %game.scope(), player = %name, error = %err, "failed to award eggs");
            game.say(&format!("{caller}: the eggs could not be collected right now."));
            egg_error = Some(err);
        }
    }
    match egg_service::try_rare_egg(game, &target, caller, player).await {
        Ok(Some(message)) => game.say(&message),
        Ok(None) => {}
        Err(err) => {
            warn!(scope = %game.scope(), player = %name, error = %err, "failed to award rare egg");
            game.say(&format!("{caller}: the rare egg could not be collected right now."));
            egg_error.get_or_insert(err);
        }
    }

    let outcome = ShotOutcome::Hit {
        points: player.points,
        count: player.count,
    };
    slot.clear();
    debug!(scope = %game.scope(), player = %name, spawn_id = target.spawn_id, "pigeon shot down");

    persist(game, &roster, &name).await?;
    match egg_error {
        Some(err) => Err(err.into()),
        None => Ok(outcome),
    }
}

async fn persist(game: &Game, roster: &PlayerRegistry, name: &str) -> Result<(), ServiceError> {
    match game.config().save_mode {
        SaveMode::Debounced => {
            game.debouncer().mark_dirty(name);
            Ok(())
        }
        SaveMode::Immediate => {
            if let Err(err) = game.save_roster(roster).await {
                warn!(scope = %game.scope(), error = %err, "failed to save roster");
                game.say("Scores could not be saved right now; they will be retried.");
                return Err(err.into());
            }
            Ok(())
        }
    }
}
