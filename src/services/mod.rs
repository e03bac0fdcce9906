/// Chat command parsing and routing.
pub mod command_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Egg rewards for mating kills and rare eggs.
pub mod egg_service;
/// Number and rank formatting for chat lines.
pub mod format;
/// Health check service.
pub mod health_service;
/// Roster listings and the top-N leaderboard.
pub mod leaderboard_service;
/// `!ping` round trips.
pub mod ping_service;
/// Coalesces roster writes into batched saves.
pub mod save_debouncer;
/// Shot resolution for `!shoot`.
pub mod shot_service;
/// Per-game spawn tick loop.
pub mod spawn_service;
/// Server-Sent Events forwarding of outbound chat lines.
pub mod sse_service;
/// Storage health polling, reconnection and degraded mode.
pub mod storage_supervisor;
