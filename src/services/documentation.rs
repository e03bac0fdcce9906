use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pigeon Hunt Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::message_stream,
        crate::routes::commands::run_command,
        crate::routes::commands::answer_ping,
        crate::routes::leaderboard::top_players,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::command::CommandRequest,
            crate::dto::command::CommandResponse,
            crate::dto::command::PingAnswerResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::sse::OutboundMessage,
            crate::dto::sse::Handshake,
            crate::dto::sse::StorageStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "commands", description = "Chat commands relayed by the transport"),
        (name = "leaderboard", description = "Per-channel rankings"),
    )
)]
/// OpenAPI document served under `/api-doc/openapi.json`.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for expected in [
            "/healthcheck",
            "/sse/messages",
            "/channels/{network}/{channel}/commands",
            "/channels/{network}/{channel}/pings/{token}",
            "/channels/{network}/{channel}/top",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
