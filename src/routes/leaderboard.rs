use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::leaderboard::{LeaderboardResponse, TopQuery},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Configure the leaderboard routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/channels/{network}/{channel}/top", get(top_players))
}

/// Top players of a channel by points.
#[utoipa::path(
    get,
    path = "/channels/{network}/{channel}/top",
    tag = "leaderboard",
    params(
        ("network" = String, Path, description = "Chat network of the game"),
        ("channel" = String, Path, description = "Channel of the game, URL-encoded"),
        TopQuery,
    ),
    responses(
        (status = 200, description = "Leaderboard rows, best first", body = LeaderboardResponse),
        (status = 404, description = "No game runs in that channel"),
        (status = 503, description = "Storage degraded or unavailable"),
    )
)]
pub async fn top_players(
    State(state): State<SharedState>,
    Path((network, channel)): Path<(String, String)>,
    Query(query): Query<TopQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let board = leaderboard_service::leaderboard(&state, &network, &channel, query.limit).await?;
    Ok(Json(board))
}
