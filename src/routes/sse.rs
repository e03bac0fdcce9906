use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/messages",
    tag = "sse",
    responses((status = 200, description = "Chat lines produced by every game", content_type = "text/event-stream", body = String))
)]
/// Stream every outbound chat line so a transport can relay it.
pub async fn message_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let subscription = sse_service::subscribe_messages(&state);
    info!("New message SSE connection");
    sse_service::to_sse_stream(subscription)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/messages", get(message_stream))
}
