/// Outbound chat sinks.
pub mod chat;
/// Per-player shot budget.
pub mod cooldown;
/// Shared random source.
pub mod dice;
/// One game per channel.
pub mod game;
/// Level labels.
pub mod level;
/// Species, spawn actions and the spawn controller.
pub mod pigeon;
/// Channel roster.
pub mod roster;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::info;

use crate::{
    config::AppConfig,
    dao::{models::PlayerScope, player_store::PlayerStore},
    error::ServiceError,
    state::{chat::HubSink, game::Game},
};

pub use self::sse::MessageHub;

/// Handle shared by routes and background tasks.
pub type SharedState = Arc<AppState>;

const MESSAGE_HUB_CAPACITY: usize = 64;

/// Central application state: the storage handle, the games it serves and the outbound hub.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn PlayerStore>,
    games: DashMap<PlayerScope, Arc<Game>>,
    messages: MessageHub,
    degraded: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn PlayerStore>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        let (shutdown_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            config,
            store,
            games: DashMap::new(),
            messages: MessageHub::new(MESSAGE_HUB_CAPACITY),
            degraded: degraded_tx,
            shutdown: shutdown_tx,
        })
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Storage backend shared by every game.
    pub fn store(&self) -> Arc<dyn PlayerStore> {
        Arc::clone(&self.store)
    }

    /// Broadcast hub every game publishes its chat lines to.
    pub fn messages(&self) -> &MessageHub {
        &self.messages
    }

    /// Return the game for `scope`, creating it on first use.
    pub fn open_game(&self, scope: PlayerScope) -> Arc<Game> {
        self.games
            .entry(scope.clone())
            .or_insert_with(|| {
                info!(%scope, "opening game");
                let chat = Arc::new(HubSink::new(scope.clone(), self.messages.sender()));
                Arc::new(Game::new(
                    scope,
                    self.config.game.clone(),
                    self.store(),
                    chat,
                ))
            })
            .clone()
    }

    /// Game for `scope`, if one is open.
    pub fn game(&self, scope: &PlayerScope) -> Option<Arc<Game>> {
        self.games.get(scope).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up an open game, failing with [`ServiceError::NotFound`] when the channel is unknown.
    pub fn require_game(&self, network: &str, channel: &str) -> Result<Arc<Game>, ServiceError> {
        let scope = PlayerScope::new(network, channel);
        self.game(&scope)
            .ok_or_else(|| ServiceError::NotFound(format!("no game running in {scope}")))
    }

    /// Snapshot of every open game.
    pub fn games(&self) -> Vec<Arc<Game>> {
        self.games
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Receiver flipped to `true` once shutdown starts.
    pub fn shutdown_watcher(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Ask every background loop to stop.
    pub fn trigger_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
