//! Motor aggregate: state machine, command mutations, and the physics step.
//!
//! Everything here is pure state manipulation. Time enters only as a
//! `now_ms` parameter and the simulated step size, so the whole module is
//! testable without a clock or any I/O. The service layer (store, driver,
//! HTTP handlers) owns the wall clock and the locking.
//!
//! The physics step runs a fixed pipeline per tick: speed ramp, RPM,
//! temperature, power, overheat check, status resolution. The order is part
//! of the model and must not be rearranged.

use std::fmt;

use uuid::Uuid;

use crate::error::MotorError;

// ============================================================================
// Model Constants
// ============================================================================

/// Maximum commandable speed, in speed units.
pub const MAX_SPEED: f64 = 100.0;

/// Temperature above which the overheat clamp trips, in °C (strictly above).
pub const OVERHEAT_THRESHOLD: f64 = 90.0;

/// Base acceleration in speed units per simulated second, before mode scaling.
pub const ACCELERATION_RATE: f64 = 2.0;

/// Ambient temperature a resting motor settles at, in °C.
pub const BASE_TEMPERATURE: f64 = 25.0;

/// Gap below which the speed ramp snaps exactly onto the target.
pub const SPEED_SNAP_EPSILON: f64 = 0.1;

/// RPM produced per speed unit.
pub const RPM_PER_UNIT: f64 = 50.0;

/// Steady-state temperature rise per speed unit, in °C.
pub const TEMP_PER_UNIT: f64 = 0.6;

/// Fraction of the temperature gap closed per step (per step, not per second).
pub const TEMP_APPROACH: f64 = 0.1;

/// Power output per speed unit at multiplier 1.0.
pub const POWER_FACTOR: f64 = 1.2;

/// Fraction of the integrated speed kept when the overheat clamp trips.
pub const OVERHEAT_CLAMP: f64 = 0.25;

/// Emergency cooldown window, in whole seconds.
pub const EMERGENCY_COOLDOWN_SECS: u64 = 5;

// ============================================================================
// Enums
// ============================================================================

/// Driving mode. Scales acceleration and power, and shifts the steady-state
/// temperature target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DriveMode {
    /// Gentle ramps, lowest thermal load
    Eco,
    /// Baseline behavior
    Normal,
    /// Fastest ramps, highest thermal load
    Sport,
}

impl DriveMode {
    /// Acceleration/power multiplier for this mode.
    pub fn multiplier(&self) -> f64 {
        match self {
            DriveMode::Eco => 0.7,
            DriveMode::Normal => 1.0,
            DriveMode::Sport => 1.4,
        }
    }

    /// Additive steady-state temperature offset for this mode, in °C.
    pub fn temperature_offset(&self) -> f64 {
        match self {
            DriveMode::Eco => 0.0,
            DriveMode::Normal => 5.0,
            DriveMode::Sport => 12.0,
        }
    }

    /// Canonical name, as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveMode::Eco => "Eco",
            DriveMode::Normal => "Normal",
            DriveMode::Sport => "Sport",
        }
    }

    /// Parse a mode from text, case-insensitively.
    ///
    /// Returns `None` for anything that is not `eco`, `normal`, or `sport`.
    pub fn from_text(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("eco") {
            Some(DriveMode::Eco)
        } else if text.eq_ignore_ascii_case("normal") {
            Some(DriveMode::Normal)
        } else if text.eq_ignore_ascii_case("sport") {
            Some(DriveMode::Sport)
        } else {
            None
        }
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of the motor state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MotorStatus {
    /// Both speeds at zero, nothing commanded
    Stopped,
    /// Ramping up toward a higher target
    Starting,
    /// Holding at target speed
    Running,
    /// Ramping down toward a lower target
    Stopping,
    /// Emergency stop issued; commands locked out during cooldown
    Emergency,
    /// Overheat clamp tripped on the last step
    Overheating,
}

impl MotorStatus {
    /// Canonical name, as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorStatus::Stopped => "Stopped",
            MotorStatus::Starting => "Starting",
            MotorStatus::Running => "Running",
            MotorStatus::Stopping => "Stopping",
            MotorStatus::Emergency => "Emergency",
            MotorStatus::Overheating => "Overheating",
        }
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Overheat Signal
// ============================================================================

/// Safety condition returned by a physics step that tripped the overheat
/// clamp.
///
/// By the time the caller sees this, the clamp has already been applied:
/// both speeds sit at [`OVERHEAT_CLAMP`] times the speed the step had just
/// integrated, and the status reads `Overheating`. This is a notification
/// that rides along with a completed mutation, not a rollback signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overheat {
    /// Temperature that tripped the clamp, in °C
    pub temperature: f64,
    /// Speed both speeds were clamped down to
    pub clamped_speed: f64,
}

// ============================================================================
// Motor
// ============================================================================

/// The motor aggregate. Exactly one instance exists per process, owned by
/// the store; everything else works on snapshots and writes them back.
#[derive(Debug, Clone, PartialEq)]
pub struct Motor {
    /// Unique identity, fixed at construction
    pub id: Uuid,
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
    /// Unix milliseconds of the most recent mutation
    pub last_updated: u64,
    /// Set while an emergency cooldown window may be open
    pub emergency_stop_time: Option<u64>,
}

impl Motor {
    /// Fresh motor: stopped, `Normal` mode, ambient temperature.
    pub fn new(now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            current_speed: 0.0,
            target_speed: 0.0,
            mode: DriveMode::Normal,
            temperature: BASE_TEMPERATURE,
            rpm: 0.0,
            power_output: 0.0,
            status: MotorStatus::Stopped,
            last_updated: now_ms,
            emergency_stop_time: None,
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Request a new target speed.
    ///
    /// Rejects values outside [0, 100] (non-finite values included) without
    /// touching state, and rejects any request made while the emergency
    /// cooldown is still running. A lapsed cooldown is cleared here: the
    /// motor drops back to `Stopped` before the new target applies.
    ///
    /// Only the target moves; the actual speed ramps on simulation steps.
    pub fn set_speed(&mut self, speed: f64, now_ms: u64) -> Result<(), MotorError> {
        if !(0.0..=MAX_SPEED).contains(&speed) {
            return Err(MotorError::InvalidSpeed { speed });
        }

        if let Some(remaining_secs) = self.cooldown_remaining(now_ms) {
            return Err(MotorError::CooldownActive { remaining_secs });
        }

        // Cooldown lapsed: leave the emergency state before applying.
        if self.status == MotorStatus::Emergency && self.emergency_stop_time.is_some() {
            self.status = MotorStatus::Stopped;
            self.emergency_stop_time = None;
        }

        self.target_speed = speed;

        if speed > 0.0 && self.status == MotorStatus::Stopped {
            self.status = MotorStatus::Starting;
        } else if speed == 0.0 && self.status == MotorStatus::Running {
            self.status = MotorStatus::Stopping;
        }

        self.last_updated = now_ms;
        Ok(())
    }

    /// Change the driving mode. Silently ignored while in emergency.
    pub fn set_mode(&mut self, mode: DriveMode, now_ms: u64) {
        if self.status == MotorStatus::Emergency {
            return;
        }
        self.mode = mode;
        self.last_updated = now_ms;
    }

    /// Cut both speeds to zero and open the cooldown window.
    ///
    /// Always succeeds and overrides any in-flight command. Repeating the
    /// stop refreshes the window.
    pub fn emergency_stop(&mut self, now_ms: u64) {
        self.current_speed = 0.0;
        self.target_speed = 0.0;
        self.status = MotorStatus::Emergency;
        self.emergency_stop_time = Some(now_ms);
        self.last_updated = now_ms;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whole seconds left in the emergency cooldown, if one is active.
    pub fn cooldown_remaining(&self, now_ms: u64) -> Option<u64> {
        let stopped_at = self.emergency_stop_time?;
        if self.status != MotorStatus::Emergency {
            return None;
        }
        let elapsed_secs = now_ms.saturating_sub(stopped_at) / 1000;
        if elapsed_secs < EMERGENCY_COOLDOWN_SECS {
            Some(EMERGENCY_COOLDOWN_SECS - elapsed_secs)
        } else {
            None
        }
    }

    /// Whether the temperature sits past the overheat threshold.
    pub fn is_overheating(&self) -> bool {
        self.temperature > OVERHEAT_THRESHOLD
    }

    /// Whether the motor currently accepts commands at all.
    pub fn can_accept_commands(&self) -> bool {
        self.status != MotorStatus::Emergency
    }

    // ------------------------------------------------------------------
    // Physics
    // ------------------------------------------------------------------

    /// Advance the physics by `dt_s` simulated seconds.
    ///
    /// Pipeline, in order: speed ramp, RPM, temperature, power, overheat
    /// check, status resolution, timestamp. Returns the overheat condition
    /// when this step tripped the clamp; status resolution is skipped on
    /// that step so `Overheating` stays observable until the next one.
    pub fn advance(&mut self, dt_s: f64, now_ms: u64) -> Option<Overheat> {
        self.step_speed(dt_s);
        self.rpm = self.current_speed * RPM_PER_UNIT;
        self.step_temperature();
        self.power_output = self.current_speed * self.mode.multiplier() * POWER_FACTOR;

        let overheat = self.check_overheat();
        if overheat.is_none() {
            self.resolve_status();
        }

        self.last_updated = now_ms;
        overheat
    }

    fn step_speed(&mut self, dt_s: f64) {
        if self.status == MotorStatus::Emergency {
            self.current_speed = 0.0;
            return;
        }

        let gap = self.target_speed - self.current_speed;
        if gap.abs() < SPEED_SNAP_EPSILON {
            self.current_speed = self.target_speed;
            return;
        }

        let max_change = ACCELERATION_RATE * self.mode.multiplier() * dt_s;
        if gap > 0.0 {
            self.current_speed += max_change.min(gap);
        } else {
            self.current_speed += (-max_change).max(gap);
        }
        self.current_speed = self.current_speed.clamp(0.0, MAX_SPEED);
    }

    fn step_temperature(&mut self) {
        let target = BASE_TEMPERATURE
            + self.current_speed * TEMP_PER_UNIT
            + self.mode.temperature_offset();
        // The approach fraction is per step, not per simulated second, so the
        // thermal response deliberately lags speed changes.
        self.temperature += (target - self.temperature) * TEMP_APPROACH;
    }

    fn check_overheat(&mut self) -> Option<Overheat> {
        if self.temperature > OVERHEAT_THRESHOLD && self.status != MotorStatus::Emergency {
            let clamped_speed = self.current_speed * OVERHEAT_CLAMP;
            self.target_speed = clamped_speed;
            self.current_speed = clamped_speed;
            self.status = MotorStatus::Overheating;
            return Some(Overheat {
                temperature: self.temperature,
                clamped_speed,
            });
        }
        None
    }

    fn resolve_status(&mut self) {
        if self.status == MotorStatus::Emergency {
            return;
        }

        if self.current_speed == 0.0 && self.target_speed == 0.0 {
            self.status = MotorStatus::Stopped;
        } else if self.current_speed > 0.0
            && (self.current_speed - self.target_speed).abs() < SPEED_SNAP_EPSILON
        {
            self.status = MotorStatus::Running;
        } else if self.target_speed > self.current_speed {
            self.status = MotorStatus::Starting;
        } else if self.target_speed < self.current_speed {
            self.status = MotorStatus::Stopping;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
