//! Pigeon Hunt Back binary entrypoint wiring config, storage, game loops, REST and SSE.

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::{net::TcpListener, task::JoinHandle, time::sleep};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pigeon_hunt_back::{
    config::AppConfig,
    dao::{
        models::PlayerScope,
        player_store::{PlayerStore, memory::MemoryPlayerStore},
    },
    routes,
    services::{spawn_service, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = build_store().await?;
    let app_state = AppState::new(config, store);

    let mut loops: Vec<JoinHandle<()>> = Vec::new();
    let network = app_state.config().network.clone();
    for channel in app_state.config().channels.clone() {
        let game = app_state.open_game(PlayerScope::new(network.clone(), channel));
        loops.push(tokio::spawn(spawn_service::run(
            game,
            app_state.shutdown_watcher(),
        )));
    }
    let supervisor = tokio::spawn(storage_supervisor::run(app_state.clone()));

    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    shutdown_games(&app_state, loops, supervisor).await;
    Ok(())
}

/// Pick the storage backend: MongoDB when `MONGO_URI` is set, memory otherwise.
async fn build_store() -> anyhow::Result<Arc<dyn PlayerStore>> {
    if env::var("MONGO_URI").is_err() {
        info!("MONGO_URI not set; keeping players in memory");
        return Ok(Arc::new(MemoryPlayerStore::new()));
    }
    connect_mongo().await
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> anyhow::Result<Arc<dyn PlayerStore>> {
    use pigeon_hunt_back::dao::player_store::mongodb::{MongoConfig, MongoPlayerStore};

    const ATTEMPTS: u32 = 5;
    let config = MongoConfig::from_env()
        .await
        .context("reading MongoDB configuration")?;
    let mut delay = Duration::from_secs(1);
    let max_delay = Duration::from_secs(10);

    let mut attempt = 1;
    loop {
        match MongoPlayerStore::connect(config.clone()).await {
            Ok(store) => {
                info!(database = %config.database_name, "connected to MongoDB");
                return Ok(Arc::new(store));
            }
            Err(err) if attempt < ATTEMPTS => {
                warn!(attempt, error = %err, "MongoDB connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
                attempt += 1;
            }
            Err(err) => return Err(err).context("connecting to MongoDB"),
        }
    }
}

#[cfg(not(feature = "mongo-store"))]
async fn connect_mongo() -> anyhow::Result<Arc<dyn PlayerStore>> {
    anyhow::bail!("MONGO_URI is set but the binary was built without the `mongo-store` feature")
}

/// Stop the tick loops, write every pending score, then wait for the supervisor.
async fn shutdown_games(state: &SharedState, loops: Vec<JoinHandle<()>>, supervisor: JoinHandle<()>) {
    state.trigger_shutdown();
    for handle in loops {
        if let Err(err) = handle.await {
            warn!(error = %err, "spawn loop ended abnormally");
        }
    }

    for game in state.games() {
        let summary = game.flush().await;
        info!(
            scope = %game.scope(),
            saved = summary.saved,
            failed = summary.failed,
            "flushed pending scores"
        );
    }

    if let Err(err) = supervisor.await {
        warn!(error = %err, "storage supervisor ended abnormally");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
