use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Check storage and report the degraded flag along with the number of running games.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if let Err(err) = state.store().health_check().await {
        warn!(error = %err, "storage health check failed");
    }

    HealthResponse::new(state.is_degraded(), state.games().len())
}
