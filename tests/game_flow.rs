use std::{sync::Arc, time::Duration};

use pigeon_hunt_back::{
    config::GameConfig,
    dao::{models::PlayerScope, player_store::memory::MemoryPlayerStore},
    services::command_service,
    state::{
        chat::RecordingSink,
        dice::Dice,
        game::Game,
        pigeon::{Pigeon, PigeonKind},
    },
};
use tokio::time::{Instant, sleep};

struct Harness {
    game: Arc<Game>,
    store: MemoryPlayerStore,
    sink: Arc<RecordingSink>,
}

fn harness() -> Harness {
    let store = MemoryPlayerStore::new();
    let sink = Arc::new(RecordingSink::new());
    let game = Arc::new(Game::with_dice(
        PlayerScope::new("integration", "#flow"),
        GameConfig::default(),
        Arc::new(store.clone()),
        sink.clone(),
        Dice::seeded(99),
    ));
    Harness { game, store, sink }
}

async fn send(h: &Harness, caller: &str, command: &str) -> bool {
    command_service::dispatch(&h.game, caller, command, &[])
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn a_round_from_spawn_to_saved_score() {
    let h = harness();

    h.game.tick().await;
    let announcement = h.sink.texts().pop().unwrap();
    assert!(!announcement.is_empty());
    assert_eq!(h.game.spawner().current_spawn_id(), 1);

    // swap in a guaranteed hit so the round is deterministic
    {
        let mut slot = h.game.target().await;
        h.game.spawner().force_spawn(
            &mut slot,
            Pigeon::new(PigeonKind::White, 50, 100),
            false,
            Instant::now(),
        );
    }
    assert!(send(&h, "Hunter", "!shoot").await);
    assert!(h.sink.texts().last().unwrap().contains("now have 50 points"));

    // nothing written until the debounce window closes
    assert!(h.store.player(h.game.scope(), "hunter").map(|p| p.points) != Some(50));
    sleep(Duration::from_millis(2_100)).await;
    assert_eq!(h.store.player(h.game.scope(), "hunter").map(|p| p.points), Some(50));

    assert!(send(&h, "hunter", "!score").await);
    assert_eq!(h.sink.texts().last().unwrap(), "hunter: 50");

    assert!(send(&h, "HUNTER", "!top5").await);
    let texts = h.sink.texts();
    assert!(texts.iter().any(|t| t == "🏆 Top 5 Pigeon Hunters"));
    assert!(texts.last().unwrap().starts_with("🥇 hunter"));
}

#[tokio::test(start_paused = true)]
async fn unshot_pigeon_escapes_after_dwell() {
    let h = harness();
    h.game.tick().await;
    sleep(Duration::from_secs(61)).await;
    h.game.tick().await;

    assert!(h.sink.texts().last().unwrap().contains("clean escape"));
    assert!(h.game.target().await.active().is_none());

    assert!(send(&h, "late", "!shoot").await);
    assert!(h.sink.texts().last().unwrap().contains("no pigeons to shoot"));
}

#[tokio::test(start_paused = true)]
async fn restart_picks_up_stored_roster() {
    let h = harness();
    {
        let mut slot = h.game.target().await;
        h.game.spawner().force_spawn(
            &mut slot,
            Pigeon::new(PigeonKind::Boss, 100, 100),
            false,
            Instant::now(),
        );
    }
    send(&h, "Keeper", "!shoot").await;
    let summary = h.game.flush().await;
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failed, 0);

    let sink = Arc::new(RecordingSink::new());
    let reborn = Game::new(
        PlayerScope::new("integration", "#flow"),
        GameConfig::default(),
        Arc::new(h.store.clone()),
        sink,
    );
    assert_eq!(reborn.sync_from_storage().await, 1);
    let roster = reborn.roster().await;
    assert_eq!(roster.get("keeper").map(|p| (p.points, p.count)), Some((100, 1)));
}
