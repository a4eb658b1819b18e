//! API request and response types for the HTTP surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::motor::{DriveMode, Motor, MotorStatus};

// ============================================================================
// Request Types
// ============================================================================

/// Body for `POST /api/motor/speed`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetSpeedRequest {
    /// Requested target speed (0 to 100)
    pub speed: f64,
}

/// Body for `POST /api/motor/mode`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeModeRequest {
    /// Requested mode name, matched case-insensitively
    pub mode: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response wrapper for command routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorResponse {
    /// Whether the command was applied
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Motor state after the command (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MotorStatusView>,
}

impl MotorResponse {
    /// Create a successful response with the resulting state
    pub fn ok(message: impl Into<String>, motor: &Motor) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(MotorStatusView::from(motor)),
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Motor snapshot as served to API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorStatusView {
    /// Motor identity
    pub id: Uuid,
    /// Current speed (0 to 100)
    pub current_speed: f64,
    /// Commanded speed (0 to 100)
    pub target_speed: f64,
    /// Active driving mode
    pub mode: DriveMode,
    /// Temperature in °C
    pub temperature: f64,
    /// Derived revolutions per minute
    pub rpm: f64,
    /// Derived power output
    pub power_output: f64,
    /// State machine position
    pub status: MotorStatus,
    /// Unix milliseconds of the last mutation
    pub last_updated: u64,
}

impl From<&Motor> for MotorStatusView {
    fn from(motor: &Motor) -> Self {
        Self {
            id: motor.id,
            current_speed: motor.current_speed,
            target_speed: motor.target_speed,
            mode: motor.mode,
            temperature: motor.temperature,
            rpm: motor.rpm,
            power_output: motor.power_output,
            status: motor.status,
            last_updated: motor.last_updated,
        }
    }
}
