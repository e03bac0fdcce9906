use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

/// Identifies the (network, channel) pair a roster belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerScope {
    /// Chat network name (e.g. an IRC network).
    pub network: String,
    /// Channel within the network, including any sigil such as `#`.
    pub channel: String,
}

impl PlayerScope {
    /// Scope for `channel` on `network`.
    pub fn new(network: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for PlayerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.channel)
    }
}

/// Persisted row for a player, keyed by (network, channel, canonical name).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Chat network the player belongs to.
    pub network: String,
    /// Channel the player belongs to.
    pub channel: String,
    /// Canonical (trimmed, lower-cased) player name.
    pub name: String,
    /// Total points earned.
    pub points: i64,
    /// Number of pigeons shot.
    pub count: i64,
    /// Eggs collected, rare eggs included.
    pub eggs: i64,
    /// Rare eggs collected.
    pub rare_eggs: i64,
    /// First time the row was written.
    pub created_at: SystemTime,
    /// Last time the row was written.
    pub updated_at: SystemTime,
}

impl PlayerEntity {
    /// Build a fresh row for `name` in `scope` carrying the given score.
    pub fn new(scope: &PlayerScope, name: impl Into<String>, points: i64, count: i64) -> Self {
        let now = SystemTime::now();
        Self {
            network: scope.network.clone(),
            channel: scope.channel.clone(),
            name: name.into(),
            points,
            count,
            eggs: 0,
            rare_eggs: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scope the row belongs to.
    pub fn scope(&self) -> PlayerScope {
        PlayerScope::new(self.network.clone(), self.channel.clone())
    }
}
