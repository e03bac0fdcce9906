use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Command request and replies.
pub mod command;
/// Health payload.
pub mod health;
/// Leaderboard rows.
pub mod leaderboard;
/// SSE payloads.
pub mod sse;
/// Custom validators.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
