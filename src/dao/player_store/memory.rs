//! In-process [`PlayerStore`] used when no database is configured and by the tests.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::SystemTime,
};

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::{PlayerStore, leaderboard_order};
use crate::dao::{
    models::{PlayerEntity, PlayerScope},
    storage::{StorageError, StorageResult},
};

type RowKey = (PlayerScope, String);

/// Volatile roster storage backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryPlayerStore {
    rows: Arc<DashMap<RowKey, PlayerEntity>>,
    upserts: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

#[derive(Clone, Copy)]
enum Ledger {
    Eggs,
    RareEggs,
}

impl MemoryPlayerStore {
    /// Empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `upsert_player` calls served so far.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store offline".into(),
                io::Error::new(io::ErrorKind::NotConnected, "offline"),
            ));
        }
        Ok(())
    }

    /// Read a single row back, mostly for assertions.
    pub fn player(&self, scope: &PlayerScope, name: &str) -> Option<PlayerEntity> {
        self.rows
            .get(&(scope.clone(), name.to_owned()))
            .map(|row| row.clone())
    }

    fn upsert(&self, player: PlayerEntity) {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let key = (player.scope(), player.name.clone());
        self.rows
            .entry(key)
            .and_modify(|existing| {
                existing.points = player.points;
                existing.count = player.count;
                existing.updated_at = SystemTime::now();
            })
            .or_insert(player);
    }

    fn read(&self, scope: PlayerScope, name: String, ledger: Ledger) -> i64 {
        self.rows
            .get(&(scope, name))
            .map(|row| match ledger {
                Ledger::Eggs => row.eggs,
                Ledger::RareEggs => row.rare_eggs,
            })
            .unwrap_or(0)
    }

    fn increment(&self, scope: PlayerScope, name: String, delta: i64, ledger: Ledger) -> i64 {
        if delta <= 0 {
            return self.read(scope, name, ledger);
        }

        let mut row = self
            .rows
            .entry((scope.clone(), name.clone()))
            .or_insert_with(|| PlayerEntity::new(&scope, name, 0, 0));
        row.updated_at = SystemTime::now();
        match ledger {
            Ledger::Eggs => {
                row.eggs += delta;
                row.eggs
            }
            Ledger::RareEggs => {
                row.rare_eggs += delta;
                row.rare_eggs
            }
        }
    }

    fn top(&self, scope: &PlayerScope, limit: usize) -> Vec<PlayerEntity> {
        let mut rows: Vec<PlayerEntity> = self
            .rows
            .iter()
            .filter(|entry| &entry.key().0 == scope)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(leaderboard_order);
        rows.truncate(limit);
        rows
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn list_players(&self, scope: PlayerScope) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let result = self.check_online().map(|()| {
            self.rows
                .iter()
                .filter(|entry| entry.key().0 == scope)
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>()
        });
        Box::pin(async move { result })
    }

    fn upsert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check_online().map(|()| self.upsert(player));
        Box::pin(async move { result })
    }

    fn top_by_points(
        &self,
        scope: PlayerScope,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let result = self.check_online().map(|()| self.top(&scope, limit));
        Box::pin(async move { result })
    }

    fn get_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
        let result = self
            .check_online()
            .map(|()| self.read(scope, name, Ledger::Eggs));
        Box::pin(async move { result })
    }

    fn add_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let result = self
            .check_online()
            .map(|()| self.increment(scope, name, delta, Ledger::Eggs));
        Box::pin(async move { result })
    }

    fn get_rare_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
        let result = self
            .check_online()
            .map(|()| self.read(scope, name, Ledger::RareEggs));
        Box::pin(async move { result })
    }

    fn add_rare_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let result = self
            .check_online()
            .map(|()| self.increment(scope, name, delta, Ledger::RareEggs));
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check_online();
        Box::pin(async move { result })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check_online();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> PlayerScope {
        PlayerScope::new("testnet", "#test")
    }

    #[tokio::test]
    async fn upsert_keeps_egg_counters() {
        let store = MemoryPlayerStore::new();
        store
            .add_eggs(scope(), "eggcollector".into(), 10)
            .await
            .unwrap();
        store
            .upsert_player(PlayerEntity::new(&scope(), "eggcollector", 150, 10))
            .await
            .unwrap();

        let row = store.player(&scope(), "eggcollector").unwrap();
        assert_eq!(row.points, 150);
        assert_eq!(row.count, 10);
        assert_eq!(row.eggs, 10);
    }

    #[tokio::test]
    async fn add_with_non_positive_delta_is_a_read() {
        let store = MemoryPlayerStore::new();
        assert_eq!(store.add_eggs(scope(), "ghost".into(), 0).await.unwrap(), 0);
        assert!(store.player(&scope(), "ghost").is_none());

        store.add_eggs(scope(), "zeroadd".into(), 25).await.unwrap();
        assert_eq!(store.add_eggs(scope(), "zeroadd".into(), 0).await.unwrap(), 25);
        assert_eq!(store.add_eggs(scope(), "zeroadd".into(), -4).await.unwrap(), 25);
        assert_eq!(
            store.add_rare_eggs(scope(), "zeroadd".into(), 0).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn add_creates_missing_rows_and_accumulates() {
        let store = MemoryPlayerStore::new();
        assert_eq!(store.add_eggs(scope(), "newplayer".into(), 5).await.unwrap(), 5);
        assert_eq!(store.add_eggs(scope(), "newplayer".into(), 7).await.unwrap(), 12);
        assert_eq!(
            store.add_rare_eggs(scope(), "newplayer".into(), 2).await.unwrap(),
            2
        );
        assert_eq!(store.get_eggs(scope(), "newplayer".into()).await.unwrap(), 12);
        assert_eq!(
            store.get_rare_eggs(scope(), "newplayer".into()).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn listing_and_top_are_scoped() {
        let store = MemoryPlayerStore::new();
        let other = PlayerScope::new("othernet", "#test");
        for (name, points, count) in [("low", 10, 1), ("high", 100, 5), ("mid", 50, 3)] {
            store
                .upsert_player(PlayerEntity::new(&scope(), name, points, count))
                .await
                .unwrap();
        }
        store
            .upsert_player(PlayerEntity::new(&other, "other", 500, 20))
            .await
            .unwrap();

        assert_eq!(store.list_players(scope()).await.unwrap().len(), 3);

        let top = store.top_by_points(scope(), 2).await.unwrap();
        let names: Vec<_> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["high", "mid"]);
        assert_eq!(store.upsert_count(), 4);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryPlayerStore::new();
        store.set_offline(true);
        assert!(store.health_check().await.is_err());
        assert!(store.add_eggs(scope(), "x".into(), 1).await.is_err());
        assert!(
            store
                .upsert_player(PlayerEntity::new(&scope(), "x", 1, 1))
                .await
                .is_err()
        );
        assert_eq!(store.upsert_count(), 0);

        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
    }
}
