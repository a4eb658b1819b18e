//! # motord
//!
//! A single-motor simulation service with a REST control API and live
//! WebSocket telemetry.
//!
//! ## Features
//!
//! - **Physics loop**: Fixed-step ramping, temperature drift, and derived
//!   RPM/power, advanced by a background driver task
//! - **Driving modes**: Eco, Normal, and Sport scale acceleration and heat
//! - **Overheat protection**: Trips past 90°C, clamps speed to a quarter
//! - **Emergency stop**: Immediate halt with a five second lockout
//! - **Live telemetry**: Broadcast hub pushing frames and alerts over
//!   WebSocket while commands arrive over JSON/HTTP
//!
//! ## Architecture
//!
//! State rules live on the aggregate so everything is testable without a
//! server or a clock:
//!
//! - `motor` - The aggregate: state machine, physics step, validation
//! - `store` - Single-slot owner serializing commands and simulation steps
//! - `simulator` - Fixed-step tick over the store
//! - `driver` - Background cadence, telemetry publishing, overheat alerts
//! - `control` - Command surface used by the HTTP handlers
//! - `telemetry` - Frames, the notifier boundary, and the broadcast hub
//! - `services` - Axum routes and the WebSocket endpoint
//!
//! ## Example
//!
//! ```rust
//! use motord::{Motor, MotorStatus};
//!
//! let mut motor = Motor::new(0);
//! motor.set_speed(60.0, 0).unwrap();
//! assert_eq!(motor.status, MotorStatus::Starting);
//!
//! // Drive the physics forward a few 100 ms steps.
//! for step in 1..=5u64 {
//!     motor.advance(0.1, step * 100);
//! }
//! assert!(motor.current_speed > 0.0);
//! assert_eq!(motor.target_speed, 60.0);
//! ```

#![warn(missing_docs)]

/// Wall-clock helper shared by the service layers.
pub mod clock;
/// Service configuration with builders and environment overrides.
pub mod config;
/// Command surface applied over the store.
pub mod control;
/// Background loop advancing the simulation and publishing telemetry.
pub mod driver;
/// Typed command failures.
pub mod error;
/// Tracing setup.
pub mod logging;
/// The motor aggregate: state machine, physics, and validation.
pub mod motor;
/// Network services for the HTTP API and WebSocket telemetry.
pub mod services;
/// Fixed-step simulation tick over the store.
pub mod simulator;
/// Single-slot store owning the motor aggregate.
pub mod store;
/// Telemetry frames, the notifier boundary, and the broadcast hub.
pub mod telemetry;

// Re-exports for convenience
pub use config::{Config, DriverConfig, WebConfig};
pub use control::MotorControl;
pub use driver::MotorDriver;
pub use error::MotorError;
pub use motor::{
    DriveMode,
    Motor,
    MotorStatus,
    Overheat,
    ACCELERATION_RATE,
    BASE_TEMPERATURE,
    EMERGENCY_COOLDOWN_SECS,
    MAX_SPEED,
    OVERHEAT_THRESHOLD,
};
pub use simulator::{Simulator, SIM_DT_S};
pub use store::{MotorStore, StoreError};
pub use telemetry::{
    HubMessage, MockNotifier, Notifier, NotifyError, TelemetryFrame, TelemetryHub,
};
