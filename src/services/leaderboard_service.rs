//! Roster listings and the top-N leaderboard, in chat and over HTTP.

use tracing::warn;

use crate::{
    dto::leaderboard::{LeaderboardEntry, LeaderboardResponse},
    error::ServiceError,
    services::format::{group_thousands, medal},
    state::{SharedState, game::Game, roster::Player},
};

const EMPTY_ROSTER: &str = "No pigeon hunters yet! Try !shoot to start earning points.";

fn join_line<'a, I, F>(players: I, render: F) -> String
where
    I: IntoIterator<Item = &'a Player>,
    F: Fn(&Player) -> String,
{
    players
        .into_iter()
        .map(|player| format!("{}: {}", player.name, render(player)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `!score` / `!points`: every player's points, highest first.
pub async fn announce_points(game: &Game) {
    let line = {
        let roster = game.roster().await;
        join_line(roster.sorted_by(|p| p.points), |p| group_thousands(p.points))
    };
    game.say(if line.is_empty() { EMPTY_ROSTER } else { &line });
}

/// `!pigeons`: every player's shot count, highest first.
pub async fn announce_counts(game: &Game) {
    let line = {
        let roster = game.roster().await;
        join_line(roster.sorted_by(|p| p.count), |p| group_thousands(p.count))
    };
    game.say(if line.is_empty() { EMPTY_ROSTER } else { &line });
}

/// `!level`: every player's level, most pigeons first.
pub async fn announce_levels(game: &Game) {
    let line = {
        let roster = game.roster().await;
        join_line(roster.sorted_by(|p| p.count), |p| {
            game.level_for(p.count).to_string()
        })
    };
    game.say(if line.is_empty() { EMPTY_ROSTER } else { &line });
}

/// `!topN`: header plus one line per player from storage.
pub async fn announce_top(game: &Game, limit: i64) -> Result<(), ServiceError> {
    let players = match game.top_by_points(limit).await {
        Ok(players) => players,
        Err(err) => {
            warn!(scope = %game.scope(), error = %err, "failed to fetch leaderboard");
            game.say("Error fetching top players");
            return Err(err.into());
        }
    };

    if players.is_empty() {
        game.say(EMPTY_ROSTER);
        return Ok(());
    }

    game.say(&format!("🏆 Top {limit} Pigeon Hunters"));
    for (position, player) in players.iter().enumerate() {
        game.say(&format!(
            "{} {} :::::: {} points | {} pigeons | Level: {} | Eggs: {} (Rare: {})",
            medal(position),
            player.name,
            group_thousands(player.points),
            group_thousands(player.count),
            game.level_for(player.count),
            group_thousands(player.eggs),
            group_thousands(player.rare_eggs),
        ));
    }
    Ok(())
}

/// JSON leaderboard for a channel. Refused while storage is degraded.
pub async fn leaderboard(
    state: &SharedState,
    network: &str,
    channel: &str,
    limit: Option<i64>,
) -> Result<LeaderboardResponse, ServiceError> {
    let game = state.require_game(network, channel)?;
    if state.is_degraded() {
        return Err(ServiceError::Degraded);
    }

    let rows = game.top_by_points(limit.unwrap_or(0)).await?;
    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let level = game.level_for(row.count);
            LeaderboardEntry::from_entity(idx + 1, row, level)
        })
        .collect();

    Ok(LeaderboardResponse {
        network: game.scope().network.clone(),
        channel: game.scope().channel.clone(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::{AppConfig, GameConfig},
        dao::{
            models::{PlayerEntity, PlayerScope},
            player_store::{PlayerStore, memory::MemoryPlayerStore},
        },
        state::{AppState, chat::RecordingSink},
    };

    fn game(store: &MemoryPlayerStore, sink: &Arc<RecordingSink>) -> Game {
        Game::new(
            PlayerScope::new("testnet", "#test"),
            GameConfig::default(),
            Arc::new(store.clone()),
            sink.clone(),
        )
    }

    #[tokio::test]
    async fn listings_sort_descending() {
        let store = MemoryPlayerStore::new();
        let sink = Arc::new(RecordingSink::new());
        let game = game(&store, &sink);
        {
            let mut roster = game.roster().await;
            let (a, _) = roster.get_or_insert("ann");
            a.points = 1_500;
            a.count = 3;
            let (b, _) = roster.get_or_insert("ben");
            b.points = 20;
            b.count = 12;
        }

        announce_points(&game).await;
        announce_counts(&game).await;
        announce_levels(&game).await;

        assert_eq!(
            sink.texts(),
            [
                "ann: 1,500, ben: 20",
                "ben: 12, ann: 3",
                "ben: Initiate, ann: Beginner",
            ]
        );
    }

    #[tokio::test]
    async fn empty_roster_gets_a_hint() {
        let store = MemoryPlayerStore::new();
        let sink = Arc::new(RecordingSink::new());
        let game = game(&store, &sink);
        announce_points(&game).await;
        announce_top(&game, 5).await.unwrap();
        assert_eq!(sink.texts(), [EMPTY_ROSTER, EMPTY_ROSTER]);
    }

    #[tokio::test]
    async fn top_lines_carry_medals_and_eggs() {
        let store = MemoryPlayerStore::new();
        let sink = Arc::new(RecordingSink::new());
        let game = game(&store, &sink);
        let scope = game.scope().clone();
        for (name, points, count) in [("gold", 300, 30), ("silver", 200, 20), ("bronze", 100, 10), ("tin", 5, 1)] {
            store
                .upsert_player(PlayerEntity::new(&scope, name, points, count))
                .await
                .unwrap();
        }
        store.add_eggs(scope.clone(), "gold".into(), 1_234).await.unwrap();

        announce_top(&game, 10).await.unwrap();

        let texts = sink.texts();
        assert_eq!(texts.len(), 5);
        assert_eq!(texts[0], "🏆 Top 10 Pigeon Hunters");
        assert!(texts[1].starts_with("🥇 gold"));
        assert!(texts[1].contains("Eggs: 1,234 (Rare: 0)"));
        assert!(texts[4].starts_with("• tin"));
    }

    #[tokio::test]
    async fn http_leaderboard_respects_degraded_mode() {
        let store = MemoryPlayerStore::new();
        let state = AppState::new(AppConfig::default(), Arc::new(store.clone()));
        let scope = PlayerScope::new("local", "#pigeons");
        state.open_game(scope.clone());
        store
            .upsert_player(PlayerEntity::new(&scope, "solo", 42, 4))
            .await
            .unwrap();

        let board = leaderboard(&state, "local", "#pigeons", None).await.unwrap();
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].rank, 1);
        assert_eq!(board.entries[0].level, "Beginner");

        assert!(matches!(
            leaderboard(&state, "local", "#nowhere", None).await,
            Err(ServiceError::NotFound(_))
        ));

        state.update_degraded(true);
        assert!(matches!(
            leaderboard(&state, "local", "#pigeons", Some(3)).await,
            Err(ServiceError::Degraded)
        ));
    }
}
