use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
/// A chat line produced by a game, to be relayed by the transport.
pub struct OutboundMessage {
    /// Network of the game that produced the line.
    pub network: String,
    /// Channel of the game that produced the line.
    pub channel: String,
    /// Where to deliver it: the channel itself or a player nick.
    pub target: String,
    /// Line to deliver.
    pub text: String,
}

impl OutboundMessage {
    /// Wrap the message as a `message` SSE event.
    pub fn to_event(&self) -> serde_json::Result<ServerEvent> {
        ServerEvent::json(Some("message".to_string()), self)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether storage is currently failing its health checks.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on the `storage` event whenever degraded mode flips.
pub struct StorageStatus {
    /// Whether storage is failing its health checks.
    pub degraded: bool,
}
