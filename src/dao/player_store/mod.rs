/// In-memory backend.
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::cmp::Ordering;

use crate::dao::models::{PlayerEntity, PlayerScope};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Limit applied when a leaderboard query asks for zero or fewer rows.
pub const DEFAULT_TOP_LIMIT: usize = 5;
/// Hard upper bound on leaderboard size.
pub const MAX_TOP_LIMIT: usize = 50;

/// Abstraction over the persistence layer for channel rosters and egg ledgers.
///
/// Egg counters are only ever touched through `add_*`, which backends must
/// implement as an atomic increment rather than a read-modify-write. A delta
/// of zero or less is a plain read.
pub trait PlayerStore: Send + Sync {
    fn list_players(&self, scope: PlayerScope) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Insert or update points and shot count. Egg counters are left untouched.
    fn upsert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn top_by_points(
        &self,
        scope: PlayerScope,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn get_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>>;
    fn add_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>>;
    fn get_rare_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>>;
    fn add_rare_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Normalise a requested leaderboard size: non-positive asks get the default,
/// oversized asks are capped.
pub fn clamp_top_limit(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_TOP_LIMIT
    } else {
        (requested as usize).min(MAX_TOP_LIMIT)
    }
}

/// Leaderboard order: points descending, then shot count descending, then name ascending.
pub fn leaderboard_order(a: &PlayerEntity, b: &PlayerEntity) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.name.cmp(&b.name))
}
