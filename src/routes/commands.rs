use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::command::{CommandRequest, CommandResponse, PingAnswerResponse},
    error::AppError,
    services::{command_service, ping_service},
    state::SharedState,
};

/// Routes through which a chat transport relays player input.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/channels/{network}/{channel}/commands", post(run_command))
        .route("/channels/{network}/{channel}/pings/{token}", post(answer_ping))
}

/// Run a chat command on behalf of a player.
#[utoipa::path(
    post,
    path = "/channels/{network}/{channel}/commands",
    tag = "commands",
    params(
        ("network" = String, Path, description = "Chat network of the game"),
        ("channel" = String, Path, description = "Channel of the game, URL-encoded"),
    ),
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command processed", body = CommandResponse),
        (status = 400, description = "Malformed command"),
        (status = 404, description = "No game runs in that channel"),
        (status = 503, description = "Storage unavailable"),
    )
)]
pub async fn run_command(
    State(state): State<SharedState>,
    Path((network, channel)): Path<(String, String)>,
    Valid(Json(payload)): Valid<Json<CommandRequest>>,
) -> Result<Json<CommandResponse>, AppError> {
    let game = state.require_game(&network, &channel)?;
    let handled =
        command_service::dispatch(&game, &payload.caller, &payload.command, &payload.args).await?;
    Ok(Json(CommandResponse { handled }))
}

/// Answer a `!ping` with the token it carried.
#[utoipa::path(
    post,
    path = "/channels/{network}/{channel}/pings/{token}",
    tag = "commands",
    params(
        ("network" = String, Path, description = "Chat network of the game"),
        ("channel" = String, Path, description = "Channel of the game, URL-encoded"),
        ("token" = String, Path, description = "Token from the CTCP PING"),
    ),
    responses(
        (status = 200, description = "Ping answered", body = PingAnswerResponse),
        (status = 400, description = "Not a ping token"),
        (status = 404, description = "Unknown game or ping"),
    )
)]
pub async fn answer_ping(
    State(state): State<SharedState>,
    Path((network, channel, token)): Path<(String, String, String)>,
) -> Result<Json<PingAnswerResponse>, AppError> {
    let game = state.require_game(&network, &channel)?;
    let elapsed = ping_service::answer_ping(&game, &token)?;
    Ok(Json(PingAnswerResponse {
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    }))
}
