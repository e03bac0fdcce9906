//! Per-channel game entity owning the roster, the target slot and their locks.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use dashmap::DashMap;
use tokio::{
    sync::{Mutex, MutexGuard as AsyncMutexGuard},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::{
    chat::ChatSink,
    cooldown::CooldownGate,
    dice::Dice,
    pigeon::{PigeonSpawnController, TargetSlot, TickOutcome},
    roster::{Player, PlayerRegistry},
};
use crate::{
    config::GameConfig,
    dao::{
        models::{PlayerEntity, PlayerScope},
        player_store::{PlayerStore, clamp_top_limit},
        storage::StorageResult,
    },
    services::save_debouncer::{FlushSummary, SaveDebouncer},
};

/// Ping waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingPing {
    /// Nick as the caller typed it.
    pub nick: String,
    /// When the ping was sent.
    pub started: Instant,
}

/// One running game, bound to a single (network, channel) scope.
///
/// Lock order when several are needed: cooldowns (released before anything
/// else), then roster, then target.
pub struct Game {
    scope: PlayerScope,
    config: GameConfig,
    store: Arc<dyn PlayerStore>,
    chat: Arc<dyn ChatSink>,
    dice: Dice,
    roster: Arc<Mutex<PlayerRegistry>>,
    target: Mutex<TargetSlot>,
    cooldowns: StdMutex<CooldownGate>,
    spawner: PigeonSpawnController,
    debouncer: SaveDebouncer,
    pings: DashMap<String, PendingPing>,
}

impl Game {
    /// Build a game with an OS-seeded random source.
    pub fn new(
        scope: PlayerScope,
        config: GameConfig,
        store: Arc<dyn PlayerStore>,
        chat: Arc<dyn ChatSink>,
    ) -> Self {
        Self::with_dice(scope, config, store, chat, Dice::new())
    }

    /// Build a game drawing from the given random source.
    pub fn with_dice(
        scope: PlayerScope,
        config: GameConfig,
        store: Arc<dyn PlayerStore>,
        chat: Arc<dyn ChatSink>,
        dice: Dice,
    ) -> Self {
        let roster = Arc::new(Mutex::new(PlayerRegistry::new()));
        let debouncer = SaveDebouncer::new(
            config.save_debounce(),
            scope.clone(),
            Arc::clone(&store),
            Arc::clone(&roster),
        );
        let cooldowns = CooldownGate::new(config.max_attempts_per_spawn, config.shot_cooldown());
        let spawner = PigeonSpawnController::new(config.escape_after());

        Self {
            scope,
            config,
            store,
            chat,
            dice,
            roster,
            target: Mutex::new(TargetSlot::default()),
            cooldowns: StdMutex::new(cooldowns),
            spawner,
            debouncer,
            pings: DashMap::new(),
        }
    }

    pub fn scope(&self) -> &PlayerScope {
        &self.scope
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PlayerStore> {
        &self.store
    }

    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    pub fn spawner(&self) -> &PigeonSpawnController {
        &self.spawner
    }

    pub fn debouncer(&self) -> &SaveDebouncer {
        &self.debouncer
    }

    /// Pings sent by `!ping` that have not been answered yet, keyed by token.
    pub fn pings(&self) -> &DashMap<String, PendingPing> {
        &self.pings
    }

    /// Lock the roster. Take it before [`target`](Self::target) when both are needed.
    pub async fn roster(&self) -> AsyncMutexGuard<'_, PlayerRegistry> {
        self.roster.lock().await
    }

    /// Lock the active-target slot.
    pub async fn target(&self) -> AsyncMutexGuard<'_, TargetSlot> {
        self.target.lock().await
    }

    /// Lock the cooldown table. Never held across an `.await`.
    pub fn cooldowns(&self) -> MutexGuard<'_, CooldownGate> {
        self.cooldowns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Post a line in the game's channel.
    pub fn say(&self, text: &str) {
        self.chat.send(&self.scope.channel, text);
    }

    /// Send a line straight to one player.
    pub fn whisper(&self, nick: &str, text: &str) {
        self.chat.send(nick, text);
    }

    /// Seed the roster from storage. Failures leave the roster as it was.
    pub async fn sync_from_storage(&self) -> usize {
        match self.store.list_players(self.scope.clone()).await {
            Ok(rows) => {
                let added = self.roster().await.seed(rows);
                info!(scope = %self.scope, players = added, "roster loaded from storage");
                added
            }
            Err(err) => {
                warn!(scope = %self.scope, error = %err, "failed to load roster; starting empty");
                0
            }
        }
    }

    /// Resolve `name` in the locked roster, creating and storing a new entry when unknown.
    ///
    /// The roster entry is kept even if the initial write fails.
    pub async fn find_player<'r>(
        &self,
        roster: &'r mut PlayerRegistry,
        name: &str,
    ) -> StorageResult<&'r mut Player> {
        let (player, created) = roster.get_or_insert(name);
        if created {
            debug!(scope = %self.scope, player = %player.name, "registering new player");
            self.store.upsert_player(player.to_entity(&self.scope)).await?;
        }
        Ok(player)
    }

    /// Run one spawn tick and announce its outcome.
    pub async fn tick(&self) -> TickOutcome {
        let _roster = self.roster().await;
        let mut slot = self.target().await;
        let outcome = self.spawner.tick(&mut slot, &self.dice, Instant::now());

        match &outcome {
            TickOutcome::Spawned {
                spawn_id, pigeon, ..
            } => info!(
                scope = %self.scope,
                spawn_id,
                kind = pigeon.kind.label(),
                "pigeon spawned"
            ),
            TickOutcome::Escaped { pigeon } => {
                info!(scope = %self.scope, kind = pigeon.kind.label(), "pigeon escaped")
            }
            TickOutcome::Waiting => {}
        }
        if let Some(message) = outcome.message() {
            self.say(&message);
        }
        outcome
    }

    /// Label for a player who has shot `count` pigeons.
    pub fn level_for(&self, count: i64) -> &'static str {
        self.config.level_table.label(count)
    }

    /// Leaderboard for the scope; the requested size is clamped first.
    pub async fn top_by_points(&self, requested: i64) -> StorageResult<Vec<PlayerEntity>> {
        self.store
            .top_by_points(self.scope.clone(), clamp_top_limit(requested))
            .await
    }

    /// Write every player in `roster`, stopping at the first failure.
    pub async fn save_roster(&self, roster: &PlayerRegistry) -> StorageResult<()> {
        for player in roster.iter() {
            self.store.upsert_player(player.to_entity(&self.scope)).await?;
        }
        Ok(())
    }

    /// Write any pending score changes now.
    pub async fn flush(&self) -> FlushSummary {
        self.debouncer.flush_now().await
    }
}
