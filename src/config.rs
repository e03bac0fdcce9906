//! Application-level configuration loading, including per-channel game tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::level::LevelTable;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PIGEON_HUNT_CONFIG_PATH";
const DEFAULT_NETWORK: &str = "local";
const DEFAULT_CHANNEL: &str = "#pigeons";
/// Spawn interval used when the configured one is zero or negative.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Chat network every configured channel belongs to.
    pub network: String,
    /// Channels opened at startup.
    pub channels: Vec<String>,
    /// Tuning shared by every game.
    pub game: GameConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        network = %app_config.network,
                        channels = app_config.channels.len(),
                        "loaded game config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document. Missing keys take their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.into(),
            channels: vec![DEFAULT_CHANNEL.into()],
            game: GameConfig::default(),
        }
    }
}

/// How score changes reach storage after a shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Only the shooter is queued on the trailing debouncer.
    #[default]
    Debounced,
    /// The whole roster is written before the shot returns.
    Immediate,
}

/// Rare-egg odds and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RareEggConfig {
    /// Percent chance that a rare egg shows up after a mating kill.
    pub appear_percent: u32,
    /// Percent chance that an appearing rare egg is actually collected.
    pub success_percent: u32,
    /// Points added to the shooter on collection.
    pub point_bonus: i64,
}

impl Default for RareEggConfig {
    fn default() -> Self {
        Self {
            appear_percent: 80,
            success_percent: 90,
            point_bonus: 500,
        }
    }
}

/// Per-game tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds between spawn ticks; non-positive means 120.
    pub spawn_interval_secs: i64,
    /// Seconds a target stays before a tick lets it escape.
    pub escape_after_secs: u64,
    /// Shots a player may take at one spawn before cooling down.
    pub max_attempts_per_spawn: u32,
    /// Length of that cooldown.
    pub shot_cooldown_secs: u64,
    /// Quiet period before debounced scores are written.
    pub save_debounce_ms: u64,
    /// How shots reach storage.
    pub save_mode: SaveMode,
    /// Rare-egg odds and reward.
    pub rare_egg: RareEggConfig,
    /// Level thresholds in use.
    pub level_table: LevelTable,
    /// Seconds before an unanswered `!ping` times out.
    pub ping_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: 120,
            escape_after_secs: 60,
            max_attempts_per_spawn: 10,
            shot_cooldown_secs: 5,
            save_debounce_ms: 2_000,
            save_mode: SaveMode::Debounced,
            rare_egg: RareEggConfig::default(),
            level_table: LevelTable::Fine,
            ping_timeout_secs: 10,
        }
    }
}

impl GameConfig {
    /// Interval between spawn ticks; non-positive values mean the default.
    pub fn spawn_interval(&self) -> Duration {
        u64::try_from(self.spawn_interval_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SPAWN_INTERVAL)
    }

    /// Dwell time as a [`Duration`].
    pub fn escape_after(&self) -> Duration {
        Duration::from_secs(self.escape_after_secs)
    }

    /// Cooldown as a [`Duration`].
    pub fn shot_cooldown(&self) -> Duration {
        Duration::from_secs(self.shot_cooldown_secs)
    }

    /// Debounce window as a [`Duration`].
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Ping timeout as a [`Duration`].
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    network: Option<String>,
    #[serde(default)]
    channels: Vec<String>,
    #[serde(default)]
    game: GameConfig,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let channels = if value.channels.is_empty() {
            vec![DEFAULT_CHANNEL.into()]
        } else {
            value.channels
        };
        Self {
            network: value
                .network
                .filter(|network| !network.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NETWORK.into()),
            channels,
            game: value.game,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
