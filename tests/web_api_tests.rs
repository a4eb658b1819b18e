//! Integration tests for the web API.
//!
//! These tests drive the Axum router directly and verify the JSON wire
//! contract, including status codes and the exact client-facing messages.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use motord::clock::unix_ms;
use motord::motor::Motor;
use motord::services::{build_router, AppState, MotorResponse, SharedState, WebServerConfig};
use motord::store::MotorStore;
use motord::telemetry::{HubMessage, TelemetryHub};
use motord::MotorControl;

fn create_test_app() -> (axum::Router, SharedState) {
    let store = Arc::new(MotorStore::new(Motor::new(unix_ms())));
    let hub = Arc::new(TelemetryHub::default());
    let state = Arc::new(AppState::new(
        MotorControl::new(store, Arc::clone(&hub)),
        hub,
    ));
    let config = WebServerConfig::default();
    let router = build_router(Arc::clone(&state), &config);
    (router, state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_status() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/motor/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["currentSpeed"], 0.0);
    assert_eq!(json["targetSpeed"], 0.0);
    assert_eq!(json["status"], "Stopped");
    assert_eq!(json["mode"], "Normal");
    assert_eq!(json["temperature"], 25.0);
    assert!(json.get("id").is_some());
}

#[tokio::test]
async fn test_set_speed() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/speed", r#"{"speed": 50}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: MotorResponse = serde_json::from_slice(&body).unwrap();

    assert!(json.success);
    assert_eq!(json.message, "Speed set to 50");
    let data = json.data.unwrap();
    assert_eq!(data.target_speed, 50.0);
    assert_eq!(data.status, motord::MotorStatus::Starting);

    let motor = state.control.status().unwrap();
    assert_eq!(motor.target_speed, 50.0);
}

#[tokio::test]
async fn test_set_speed_validation() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/speed", r#"{"speed": 150}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "Invalid speed value: 150. Speed must be between 0 and 100."
    );
    assert!(json.get("data").is_none());

    // The rejected command must not leak into the store.
    assert_eq!(state.control.status().unwrap().target_speed, 0.0);
}

#[tokio::test]
async fn test_set_speed_negative_rejected() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(post_json("/api/motor/speed", r#"{"speed": -1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(post_json("/api/motor/speed", r#"{"speed": "#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_mode_case_insensitive() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/mode", r#"{"mode": "sport"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    // The message echoes the caller's spelling; the state is canonical.
    assert_eq!(json["message"], "Driving mode changed to sport");
    assert_eq!(json["data"]["mode"], "Sport");

    assert_eq!(
        state.control.status().unwrap().mode,
        motord::DriveMode::Sport
    );
}

#[tokio::test]
async fn test_change_mode_invalid() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/mode", r#"{"mode": "turbo"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "Invalid driving mode: turbo. Valid modes are: Eco, Normal, Sport"
    );

    assert_eq!(
        state.control.status().unwrap().mode,
        motord::DriveMode::Normal
    );
}

#[tokio::test]
async fn test_emergency_stop() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/speed", r#"{"speed": 80}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/motor/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Emergency stop activated");
    assert_eq!(json["data"]["status"], "Emergency");
    assert_eq!(json["data"]["currentSpeed"], 0.0);
    assert_eq!(json["data"]["targetSpeed"], 0.0);

    let motor = state.control.status().unwrap();
    assert_eq!(motor.status, motord::MotorStatus::Emergency);
}

#[tokio::test]
async fn test_speed_rejected_during_cooldown() {
    let (app, _state) = create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/motor/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/api/motor/speed", r#"{"speed": 10}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Motor in emergency cooldown. Wait "));
    assert!(message.ends_with("more seconds."));
}

#[tokio::test]
async fn test_emergency_stop_broadcasts_alert() {
    let (app, state) = create_test_app();
    let mut rx = state.hub.subscribe();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/motor/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let message = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
        .await
        .expect("alert should already be queued")
        .unwrap();
    assert_eq!(
        message,
        HubMessage::OverheatingAlert("Emergency stop activated".to_string())
    );
}

#[tokio::test]
async fn test_mode_change_during_emergency_reports_old_mode() {
    let (app, _state) = create_test_app();

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/motor/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(post_json("/api/motor/mode", r#"{"mode": "Eco"}"#))
        .await
        .unwrap();

    // Accepted but ignored while the motor sits in emergency.
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["data"]["mode"], "Normal");
    assert_eq!(json["data"]["status"], "Emergency");
}

#[tokio::test]
async fn test_not_found() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
