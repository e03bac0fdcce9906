use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Number of channels with a running game.
    pub games: usize,
}

impl HealthResponse {
    /// Payload for the given degraded flag and game count.
    pub fn new(degraded: bool, games: usize) -> Self {
        let status = if degraded { "degraded" } else { "ok" };
        Self {
            status: status.to_string(),
            games,
        }
    }
}
