//! Axum-based HTTP server for the motor control API and telemetry hub.
//!
//! Provides REST endpoints for:
//! - POST `/api/motor/speed` - Set target speed
//! - POST `/api/motor/mode` - Change driving mode
//! - POST `/api/motor/stop` - Emergency stop
//! - GET `/api/motor/status` - Current motor snapshot
//! - GET `/motorhub` - WebSocket subscription to live telemetry
//!
//! Command routes answer 200 on success, 400 on validation failures
//! (out-of-range speed, unknown mode, active cooldown), and 500 when the
//! store is unavailable.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::config::WebConfig;
use crate::control::MotorControl;
use crate::error::MotorError;
use crate::motor::DriveMode;
use crate::telemetry::{HubMessage, TelemetryHub};

use super::api::{ChangeModeRequest, MotorResponse, MotorStatusView, SetSpeedRequest};

// ============================================================================
// Shared State
// ============================================================================

/// State shared by all routes.
pub struct AppState {
    /// Command surface over the motor store
    pub control: MotorControl<TelemetryHub>,
    /// Fan-out hub backing the WebSocket endpoint
    pub hub: Arc<TelemetryHub>,
}

impl AppState {
    /// Bundle the command surface and hub for the router.
    pub fn new(control: MotorControl<TelemetryHub>, hub: Arc<TelemetryHub>) -> Self {
        Self { control, hub }
    }
}

/// Shared state handle passed to every handler.
pub type SharedState = Arc<AppState>;

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/motor/speed - Set target speed
///
/// Accepts JSON: `{"speed": 50}`
async fn set_speed(
    State(state): State<SharedState>,
    Json(request): Json<SetSpeedRequest>,
) -> (StatusCode, Json<MotorResponse>) {
    match state.control.set_speed(request.speed) {
        Ok(motor) => (
            StatusCode::OK,
            Json(MotorResponse::ok(
                format!("Speed set to {}", request.speed),
                &motor,
            )),
        ),
        Err(err) => command_failure(err),
    }
}

/// POST /api/motor/mode - Change driving mode
///
/// Accepts JSON: `{"mode": "Sport"}`, matched case-insensitively
async fn change_mode(
    State(state): State<SharedState>,
    Json(request): Json<ChangeModeRequest>,
) -> (StatusCode, Json<MotorResponse>) {
    let Some(mode) = DriveMode::from_text(&request.mode) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(MotorResponse::err(format!(
                "Invalid driving mode: {}. Valid modes are: Eco, Normal, Sport",
                request.mode
            ))),
        );
    };

    match state.control.set_mode(mode) {
        Ok(motor) => (
            StatusCode::OK,
            Json(MotorResponse::ok(
                format!("Driving mode changed to {}", request.mode),
                &motor,
            )),
        ),
        Err(err) => command_failure(err),
    }
}

/// POST /api/motor/stop - Emergency stop
async fn emergency_stop(State(state): State<SharedState>) -> (StatusCode, Json<MotorResponse>) {
    match state.control.emergency_stop() {
        Ok(motor) => (
            StatusCode::OK,
            Json(MotorResponse::ok("Emergency stop activated", &motor)),
        ),
        Err(err) => command_failure(err),
    }
}

/// GET /api/motor/status - Current motor snapshot
async fn get_status(State(state): State<SharedState>) -> Response {
    match state.control.status() {
        Ok(motor) => (StatusCode::OK, Json(MotorStatusView::from(&motor))).into_response(),
        Err(err) => {
            error!(error = %err, "status read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MotorResponse::err("Internal server error")),
            )
                .into_response()
        }
    }
}

/// Map a command error onto the HTTP surface.
fn command_failure(err: MotorError) -> (StatusCode, Json<MotorResponse>) {
    if err.is_validation() {
        (StatusCode::BAD_REQUEST, Json(MotorResponse::err(err.to_string())))
    } else {
        error!(error = %err, "command failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MotorResponse::err("Internal server error")),
        )
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(MotorResponse::err("Not found")))
}

// ============================================================================
// Telemetry WebSocket
// ============================================================================

/// GET /motorhub - WebSocket subscription to live telemetry
async fn motor_hub(State(state): State<SharedState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| hub_session(socket, state))
}

/// One subscriber session: greet, then forward hub broadcasts until the
/// client goes away.
async fn hub_session(socket: WebSocket, state: SharedState) {
    let mut rx = state.hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    let greeting = HubMessage::StatusMessage("Connected to motor telemetry".to_string());
    if forward(&mut sink, &greeting).await.is_err() {
        return;
    }
    debug!("telemetry subscriber connected");

    loop {
        tokio::select! {
            broadcast = rx.recv() => match broadcast {
                Ok(message) => {
                    if forward(&mut sink, &message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "slow telemetry subscriber dropped frames");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                // Subscribers only listen; anything but a close is ignored.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("telemetry subscriber disconnected");
}

async fn forward(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &HubMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).map_err(axum::Error::new)?;
    sink.send(Message::Text(text)).await
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Route the WebSocket hub mounts on
    pub hub_path: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:5000".parse().unwrap(),
            cors_permissive: true,
            hub_path: "/motorhub".to_string(),
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
            hub_path: config.hub_path.clone(),
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router(state: SharedState, config: &WebServerConfig) -> Router {
    let mut router = Router::new()
        // API routes
        .route("/api/motor/speed", post(set_speed))
        .route("/api/motor/mode", post(change_mode))
        .route("/api/motor/stop", post(emergency_stop))
        .route("/api/motor/status", get(get_status))
        // Live telemetry
        .route(&config.hub_path, get(motor_hub))
        // Fallback
        .fallback(not_found)
        .with_state(state);

    // Add CORS if requested
    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state
///
/// Serves until the `shutdown` future resolves, then drains in-flight
/// connections and returns.
pub async fn run_server_with_state(
    state: SharedState,
    config: WebServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
