//! Library crate for pigeon-hunt-back, exposing modules for the binary and integration tests.

/// Configuration loading.
pub mod config;
/// Storage layer.
pub mod dao;
/// Wire types for HTTP and SSE.
pub mod dto;
/// Service and HTTP errors.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Game operations and background tasks.
pub mod services;
/// In-memory game state.
pub mod state;
