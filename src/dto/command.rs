use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::{validate_command_name, validate_nick};

/// A chat command relayed by the transport, already split into words.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CommandRequest {
    /// Nick of the player who typed the command, as it appeared in chat.
    #[validate(length(min = 1, max = 64), custom(function = "validate_nick"))]
    pub caller: String,
    /// Command word including the leading `!`, e.g. `!shoot` or `!top7`.
    #[validate(length(min = 2, max = 32), custom(function = "validate_command_name"))]
    pub command: String,
    /// Remaining words of the message.
    #[serde(default)]
    #[validate(length(max = 16))]
    pub args: Vec<String>,
}

/// Whether the command was recognised and handled.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandResponse {
    /// `false` when the command word was not recognised.
    pub handled: bool,
}

/// Result of answering a `!ping`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PingAnswerResponse {
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}
