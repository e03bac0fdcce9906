use axum::Router;

use crate::state::SharedState;

/// Command and ping routes.
pub mod commands;
/// Swagger UI.
pub mod docs;
/// Health check route.
pub mod health;
/// Leaderboard route.
pub mod leaderboard;
/// Outbound message stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(commands::router())
        .merge(leaderboard::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
