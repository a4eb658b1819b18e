//! Network services for the HTTP API and WebSocket telemetry.
//!
//! The `web` module hosts the Axum server; `api` holds the JSON request and
//! response types it speaks. Both sit on top of [`crate::control`] and
//! [`crate::telemetry`], which own the actual behavior.

pub mod api;
pub mod web;

// Re-exports
pub use api::{ChangeModeRequest, MotorResponse, MotorStatusView, SetSpeedRequest};
pub use web::{build_router, run_server_with_state, AppState, SharedState, WebServerConfig};
