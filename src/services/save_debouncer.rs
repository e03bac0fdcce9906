//! Trailing debounce in front of roster persistence.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex, MutexGuard},
    time::Duration,
};

use tokio::{sync::Mutex, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::{
    dao::{models::PlayerScope, player_store::PlayerStore},
    state::roster::{PlayerRegistry, canonical_name},
};

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Players written.
    pub saved: usize,
    /// Players whose write failed.
    pub failed: usize,
}

/// Coalesces repeated save requests into one write per quiet period.
///
/// Every [`mark_dirty`](Self::mark_dirty) restarts the delay from scratch, so a
/// steady stream of updates defers the write until the stream pauses.
#[derive(Clone)]
pub struct SaveDebouncer {
    inner: Arc<DebouncerInner>,
}

struct DebouncerInner {
    delay: Duration,
    scope: PlayerScope,
    store: Arc<dyn PlayerStore>,
    roster: Arc<Mutex<PlayerRegistry>>,
    pending: StdMutex<Pending>,
}

#[derive(Default)]
struct Pending {
    dirty: HashSet<String>,
    timer: Option<JoinHandle<()>>,
    /// Timers that passed their generation check and are writing.
    writing: Vec<JoinHandle<()>>,
    generation: u64,
}

impl SaveDebouncer {
    /// Debouncer for one game's roster.
    pub fn new(
        delay: Duration,
        scope: PlayerScope,
        store: Arc<dyn PlayerStore>,
        roster: Arc<Mutex<PlayerRegistry>>,
    ) -> Self {
        Self {
            inner: Arc::new(DebouncerInner {
                delay,
                scope,
                store,
                roster,
                pending: StdMutex::new(Pending::default()),
            }),
        }
    }

    /// Queue `name` for saving and re-arm the timer.
    pub fn mark_dirty(&self, name: &str) {
        let mut pending = self.inner.pending();
        pending.dirty.insert(canonical_name(name));

        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.generation += 1;
        let generation = pending.generation;

        let inner = Arc::clone(&self.inner);
        pending.timer = Some(tokio::spawn(async move {
            sleep(inner.delay).await;
            inner.fire(generation).await;
        }));
    }

    /// Cancel the pending timer, wait for writes already running, then write the dirty set.
    pub async fn flush_now(&self) -> FlushSummary {
        let (names, writing) = {
            let mut pending = self.inner.pending();
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
            pending.generation += 1;
            (
                std::mem::take(&mut pending.dirty),
                std::mem::take(&mut pending.writing),
            )
        };

        for write in writing {
            if let Err(err) = write.await {
                warn!(scope = %self.inner.scope, error = %err, "debounced write ended abnormally");
            }
        }
        self.inner.save(names).await
    }

    /// Number of names waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.inner.pending().dirty.len()
    }
}

impl DebouncerInner {
    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn fire(&self, generation: u64) {
        let names = {
            let mut pending = self.pending();
            if pending.generation != generation {
                return;
            }
            // past this point a re-arm must not abort the write below
            pending.writing.retain(|write| !write.is_finished());
            if let Some(own) = pending.timer.take() {
                pending.writing.push(own);
            }
            std::mem::take(&mut pending.dirty)
        };
        self.save(names).await;
    }

    async fn save(&self, names: HashSet<String>) -> FlushSummary {
        if names.is_empty() {
            return FlushSummary::default();
        }

        let entities: Vec<_> = {
            let roster = self.roster.lock().await;
            names
                .iter()
                .filter_map(|name| roster.get(name))
                .map(|player| player.to_entity(&self.scope))
                .collect()
        };

        let mut summary = FlushSummary::default();
        for entity in entities {
            let name = entity.name.clone();
            match self.store.upsert_player(entity).await {
                Ok(()) => summary.saved += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(scope = %self.scope, player = %name, error = %err, "failed to save player");
                }
            }
        }

        debug!(
            scope = %self.scope,
            saved = summary.saved,
            failed = summary.failed,
            "flushed dirty players"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;

    use super::*;
    use crate::dao::{
        models::PlayerEntity,
        player_store::memory::MemoryPlayerStore,
        storage::{StorageError, StorageResult},
    };

    const DELAY: Duration = Duration::from_secs(2);

    fn scope() -> PlayerScope {
        PlayerScope::new("testnet", "#test")
    }

    fn roster_with(names: &[&str]) -> Arc<Mutex<PlayerRegistry>> {
        let mut roster = PlayerRegistry::new();
        for name in names {
            let (player, _) = roster.get_or_insert(name);
            player.points = 10;
            player.count = 1;
        }
        Arc::new(Mutex::new(roster))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_marks_produces_one_write() {
        let store = MemoryPlayerStore::new();
        let debouncer = SaveDebouncer::new(DELAY, scope(), Arc::new(store.clone()), roster_with(&["alice"]));

        for _ in 0..5 {
            debouncer.mark_dirty("Alice");
            sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(store.upsert_count(), 0);

        sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(store.upsert_count(), 1);
        assert_eq!(debouncer.pending_len(), 0);
        assert_eq!(store.player(&scope(), "alice").map(|p| p.points), Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_marks_produce_two_writes() {
        let store = MemoryPlayerStore::new();
        let debouncer = SaveDebouncer::new(DELAY, scope(), Arc::new(store.clone()), roster_with(&["bob"]));

        debouncer.mark_dirty("bob");
        sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(store.upsert_count(), 1);

        debouncer.mark_dirty("bob");
        sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(store.upsert_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_now_cancels_timer() {
        let store = MemoryPlayerStore::new();
        let debouncer = SaveDebouncer::new(
            DELAY,
            scope(),
            Arc::new(store.clone()),
            roster_with(&["carol", "dave"]),
        );

        debouncer.mark_dirty("carol");
        debouncer.mark_dirty("dave");
        let summary = debouncer.flush_now().await;
        assert_eq!(summary, FlushSummary { saved: 2, failed: 0 });

        sleep(DELAY * 2).await;
        assert_eq!(store.upsert_count(), 2);
        assert_eq!(debouncer.flush_now().await, FlushSummary::default());
    }

    struct FlakyStore {
        inner: MemoryPlayerStore,
        broken: &'static str,
        latency: Duration,
    }

    impl PlayerStore for FlakyStore {
        fn list_players(&self, scope: PlayerScope) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            self.inner.list_players(scope)
        }

        fn upsert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
            if player.name == self.broken {
                return Box::pin(async {
                    Err(StorageError::unavailable(
                        "write refused".into(),
                        std::io::Error::other("write refused"),
                    ))
                });
            }
            let inner = self.inner.clone();
            let latency = self.latency;
            Box::pin(async move {
                sleep(latency).await;
                inner.upsert_player(player).await
            })
        }

        fn top_by_points(
            &self,
            scope: PlayerScope,
            limit: usize,
        ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            self.inner.top_by_points(scope, limit)
        }

        fn get_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
            self.inner.get_eggs(scope, name)
        }

        fn add_eggs(
            &self,
            scope: PlayerScope,
            name: String,
            delta: i64,
        ) -> BoxFuture<'static, StorageResult<i64>> {
            self.inner.add_eggs(scope, name, delta)
        }

        fn get_rare_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
            self.inner.get_rare_eggs(scope, name)
        }

        fn add_rare_eggs(
            &self,
            scope: PlayerScope,
            name: String,
            delta: i64,
        ) -> BoxFuture<'static, StorageResult<i64>> {
            self.inner.add_rare_eggs(scope, name, delta)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn one_failing_player_does_not_abort_the_batch() {
        let memory = MemoryPlayerStore::new();
        let store = FlakyStore {
            inner: memory.clone(),
            broken: "erin",
            latency: Duration::ZERO,
        };
        let debouncer = SaveDebouncer::new(
            DELAY,
            scope(),
            Arc::new(store),
            roster_with(&["erin", "frank", "gina"]),
        );

        for name in ["erin", "frank", "gina"] {
            debouncer.mark_dirty(name);
        }
        let summary = debouncer.flush_now().await;

        assert_eq!(summary, FlushSummary { saved: 2, failed: 1 });
        assert!(memory.player(&scope(), "frank").is_some());
        assert!(memory.player(&scope(), "gina").is_some());
        assert!(memory.player(&scope(), "erin").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_now_waits_for_a_write_already_running() {
        let memory = MemoryPlayerStore::new();
        let store = FlakyStore {
            inner: memory.clone(),
            broken: "",
            latency: Duration::from_secs(1),
        };
        let debouncer = SaveDebouncer::new(
            DELAY,
            scope(),
            Arc::new(store),
            roster_with(&["hank", "iris"]),
        );

        debouncer.mark_dirty("hank");
        debouncer.mark_dirty("iris");
        // timer has fired and the first write is in progress
        sleep(DELAY + Duration::from_millis(500)).await;
        assert_eq!(debouncer.pending_len(), 0);
        assert_eq!(memory.upsert_count(), 0);

        let summary = debouncer.flush_now().await;

        assert_eq!(summary, FlushSummary::default());
        assert!(memory.player(&scope(), "hank").is_some());
        assert!(memory.player(&scope(), "iris").is_some());
    }
}
