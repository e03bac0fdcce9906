use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::dao::models::PlayerEntity;
use crate::dto::format_system_time;

/// Query string accepted by the leaderboard route.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TopQuery {
    /// Number of rows; non-positive means 5, values above 50 are capped.
    pub limit: Option<i64>,
}

/// One leaderboard row.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    /// Canonical player name.
    pub name: String,
    /// Total points.
    pub points: i64,
    /// Pigeons shot.
    pub count: i64,
    /// Level label for `count`.
    pub level: String,
    /// Eggs collected, rare ones included.
    pub eggs: i64,
    /// Rare eggs collected.
    pub rare_eggs: i64,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}

impl LeaderboardEntry {
    /// Row at `rank` built from a stored player.
    pub fn from_entity(rank: usize, entity: PlayerEntity, level: &str) -> Self {
        Self {
            rank,
            name: entity.name,
            points: entity.points,
            count: entity.count,
            level: level.to_owned(),
            eggs: entity.eggs,
            rare_eggs: entity.rare_eggs,
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Leaderboard for one channel.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Network of the game.
    pub network: String,
    /// Channel of the game.
    pub channel: String,
    /// Rows, best first.
    pub entries: Vec<LeaderboardEntry>,
}
