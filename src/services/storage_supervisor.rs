use std::{future::Future, time::Duration};

use tokio::{sync::watch, time::sleep};
use tracing::{info, warn};

use crate::state::SharedState;

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Watch storage health, reconnecting with backoff and toggling degraded mode.
///
/// Returns once shutdown is signalled.
pub async fn run(state: SharedState) {
    let store = state.store();
    let mut shutdown = state.shutdown_watcher();
    let mut delay = INITIAL_DELAY;

    loop {
        let Some(health) = guarded(&mut shutdown, store.health_check()).await else {
            break;
        };
        match health {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                delay = INITIAL_DELAY;
                if pause(&mut shutdown, HEALTH_POLL_INTERVAL).await {
                    break;
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                let mut attempt = 0;
                let mut reconnect_delay = INITIAL_DELAY;
                let mut reconnected = false;

                while attempt < MAX_RECONNECT_ATTEMPTS {
                    let Some(reconnect) = guarded(&mut shutdown, store.try_reconnect()).await
                    else {
                        return;
                    };
                    match reconnect {
                        Ok(()) => {
                            info!("storage reconnection succeeded after health check failure");
                            reconnected = true;
                            break;
                        }
                        Err(reconnect_err) => {
                            if attempt == 0 {
                                warn!(
                                    attempt, error = %reconnect_err,
                                    "storage reconnect first attempt failed; entering degraded mode"
                                );
                                state.update_degraded(true);
                            } else {
                                warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                            }
                            attempt += 1;
                            if pause(&mut shutdown, reconnect_delay).await {
                                return;
                            }
                            reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                        }
                    }
                }

                if reconnected {
                    state.update_degraded(false);
                    if pause(&mut shutdown, HEALTH_POLL_INTERVAL).await {
                        break;
                    }
                } else {
                    warn!("exhausted storage reconnect attempts; staying in degraded mode");
                    if pause(&mut shutdown, delay).await {
                        break;
                    }
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
        }
    }

    info!("storage supervisor stopped");
}

/// Run a store call unless shutdown arrives first; `None` on shutdown.
async fn guarded<T>(
    shutdown: &mut watch::Receiver<bool>,
    call: impl Future<Output = T>,
) -> Option<T> {
    if *shutdown.borrow() {
        return None;
    }
    tokio::select! {
        result = call => Some(result),
        _ = shutdown.changed() => None,
    }
}

/// Sleep for `duration`; `true` when shutdown arrived first.
async fn pause(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = sleep(duration) => false,
        _ = shutdown.changed() => true,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::{BoxFuture, pending};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{PlayerEntity, PlayerScope},
            player_store::{PlayerStore, memory::MemoryPlayerStore},
            storage::StorageResult,
        },
        state::AppState,
    };

    #[tokio::test(start_paused = true)]
    async fn flips_degraded_while_storage_is_down() {
        let store = MemoryPlayerStore::new();
        let state = AppState::new(AppConfig::default(), Arc::new(store.clone()));
        let handle = tokio::spawn(run(Arc::clone(&state)));

        sleep(Duration::from_secs(1)).await;
        assert!(!state.is_degraded());

        store.set_offline(true);
        sleep(HEALTH_POLL_INTERVAL + Duration::from_secs(1)).await;
        assert!(state.is_degraded());

        store.set_offline(false);
        sleep(MAX_DELAY + HEALTH_POLL_INTERVAL).await;
        assert!(!state.is_degraded());

        state.trigger_shutdown();
        handle.await.unwrap();
    }

    /// Store whose calls never complete, like a database that stopped answering.
    struct StalledStore;

    impl PlayerStore for StalledStore {
        fn list_players(&self, _: PlayerScope) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(pending())
        }

        fn upsert_player(&self, _: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(pending())
        }

        fn top_by_points(&self, _: PlayerScope, _: usize) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(pending())
        }

        fn get_eggs(&self, _: PlayerScope, _: String) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(pending())
        }

        fn add_eggs(&self, _: PlayerScope, _: String, _: i64) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(pending())
        }

        fn get_rare_eggs(&self, _: PlayerScope, _: String) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(pending())
        }

        fn add_rare_eggs(&self, _: PlayerScope, _: String, _: i64) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(pending())
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(pending())
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(pending())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_health_check_does_not_hold_up_shutdown() {
        let state = AppState::new(AppConfig::default(), Arc::new(StalledStore));
        let handle = tokio::spawn(run(Arc::clone(&state)));

        sleep(Duration::from_secs(30)).await;
        assert!(!handle.is_finished());

        state.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("supervisor should stop on shutdown")
            .unwrap();
    }
}
