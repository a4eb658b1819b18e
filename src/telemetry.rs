//! Telemetry frames, the notifier boundary, and the broadcast hub.
//!
//! The driver loop talks to the outside world only through the [`Notifier`]
//! trait: one periodic telemetry stream plus an alert side-channel. The
//! production implementation is [`TelemetryHub`], a broadcast fan-out the
//! WebSocket endpoint subscribes to; [`MockNotifier`] records calls for
//! tests and can be told to fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::motor::{DriveMode, Motor, MotorStatus};

/// Undelivered messages buffered per hub subscriber before it starts
/// lagging and skipping.
pub const DEFAULT_HUB_CAPACITY: usize = 64;

// ============================================================================
// Telemetry Frame
// ============================================================================

/// One snapshot of the motor as pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryFrame {
    /// Current speed in [0, 100]
    pub current_speed: f64,
    /// Commanded speed in [0, 100]
    pub target_speed: f64,
    /// Active driving mode
    pub mode: DriveMode,
    /// Motor temperature in °C
    pub temperature: f64,
    /// Derived revolutions per minute
    pub rpm: f64,
    /// Derived power output
    pub power_output: f64,
    /// State machine position
    pub status: MotorStatus,
    /// Unix milliseconds when the frame was built
    pub timestamp: u64,
    /// Whether the temperature sits past the overheat threshold
    pub is_overheating: bool,
}

impl TelemetryFrame {
    /// Build a frame from a motor snapshot.
    pub fn from_motor(motor: &Motor, now_ms: u64) -> Self {
        Self {
            current_speed: motor.current_speed,
            target_speed: motor.target_speed,
            mode: motor.mode,
            temperature: motor.temperature,
            rpm: motor.rpm,
            power_output: motor.power_output,
            status: motor.status,
            timestamp: now_ms,
            is_overheating: motor.is_overheating(),
        }
    }
}

// ============================================================================
// Notifier Boundary
// ============================================================================

/// Failure to hand a message to the outbound transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notifier unavailable: {reason}")]
pub struct NotifyError {
    /// Transport-specific description of what went wrong
    pub reason: String,
}

impl NotifyError {
    /// Error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outbound side-channel for telemetry and alerts.
///
/// Fire-and-forget from the caller's point of view: implementations deliver
/// what they can, and a returned error gets logged by the caller, never
/// treated as fatal.
pub trait Notifier: Send + Sync {
    /// Push one telemetry frame to all subscribers.
    fn broadcast_telemetry(&self, frame: TelemetryFrame) -> Result<(), NotifyError>;

    /// Push an alert message to all subscribers.
    fn send_alert(&self, message: &str) -> Result<(), NotifyError>;
}

// ============================================================================
// Hub Messages
// ============================================================================

/// Message fanned out to hub subscribers, tagged by event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum HubMessage {
    /// Periodic telemetry frame
    MotorData(TelemetryFrame),
    /// Critical alert text
    OverheatingAlert(String),
    /// Connection lifecycle text
    StatusMessage(String),
}

// ============================================================================
// Telemetry Hub
// ============================================================================

/// Broadcast fan-out behind the WebSocket endpoint.
///
/// Every subscriber receives every message sent after it subscribed. Slow
/// subscribers lag and skip; they can never back-pressure the driver loop.
#[derive(Debug, Clone)]
pub struct TelemetryHub {
    tx: broadcast::Sender<HubMessage>,
}

impl TelemetryHub {
    /// Hub that buffers `capacity` undelivered messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to every message sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HubMessage> {
        self.tx.subscribe()
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, message: HubMessage) {
        // Broadcasting into an empty room is not a delivery failure.
        let _ = self.tx.send(message);
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl Notifier for TelemetryHub {
    fn broadcast_telemetry(&self, frame: TelemetryFrame) -> Result<(), NotifyError> {
        self.send(HubMessage::MotorData(frame));
        Ok(())
    }

    fn send_alert(&self, message: &str) -> Result<(), NotifyError> {
        self.send(HubMessage::OverheatingAlert(message.to_string()));
        Ok(())
    }
}

// ============================================================================
// Mock Notifier
// ============================================================================

/// Recording notifier for tests.
///
/// Captures every frame and alert it is handed; flip `set_failing` to make
/// both operations return errors instead, for exercising the callers'
/// log-and-continue paths.
#[derive(Debug, Default)]
pub struct MockNotifier {
    frames: Mutex<Vec<TelemetryFrame>>,
    alerts: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockNotifier {
    /// Recording notifier that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that rejects every call.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::Relaxed);
        notifier
    }

    /// Switch failure mode on or off.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }

    /// All frames recorded so far.
    pub fn frames(&self) -> Vec<TelemetryFrame> {
        self.frames.lock().unwrap().clone()
    }

    /// All alert messages recorded so far.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    /// Number of frames recorded so far.
    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// Number of alerts recorded so far.
    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn broadcast_telemetry(&self, frame: TelemetryFrame) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(NotifyError::new("mock notifier set to fail"));
        }
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    fn send_alert(&self, message: &str) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(NotifyError::new("mock notifier set to fail"));
        }
        self.alerts.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
