//! Command surface applied over the store.
//!
//! Thin by design: validation and state rules live on the motor aggregate.
//! This layer adds the wall clock, the store lock, logging, and the
//! emergency alert, and hands each caller the snapshot that resulted from
//! its command.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock;
use crate::error::MotorError;
use crate::motor::{DriveMode, Motor};
use crate::store::MotorStore;
use crate::telemetry::Notifier;

/// Applies API commands to the motor and reports the resulting state.
pub struct MotorControl<N> {
    store: Arc<MotorStore>,
    notifier: Arc<N>,
}

impl<N: Notifier> MotorControl<N> {
    /// Command surface over the given store and notifier.
    pub fn new(store: Arc<MotorStore>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Apply a speed command and return the resulting snapshot.
    pub fn set_speed(&self, speed: f64) -> Result<Motor, MotorError> {
        info!(speed, "setting motor speed");
        let now_ms = clock::unix_ms();
        self.store.with(|motor| {
            motor.set_speed(speed, now_ms)?;
            Ok(motor.clone())
        })?
    }

    /// Change the driving mode and return the resulting snapshot.
    ///
    /// A mode change during emergency is a defined no-op, not an error.
    pub fn set_mode(&self, mode: DriveMode) -> Result<Motor, MotorError> {
        info!(mode = %mode, "changing driving mode");
        let now_ms = clock::unix_ms();
        let motor = self.store.with(|motor| {
            motor.set_mode(mode, now_ms);
            motor.clone()
        })?;
        Ok(motor)
    }

    /// Trip the emergency stop and return the resulting snapshot.
    pub fn emergency_stop(&self) -> Result<Motor, MotorError> {
        warn!("emergency stop requested");
        let now_ms = clock::unix_ms();
        let motor = self.store.with(|motor| {
            motor.emergency_stop(now_ms);
            motor.clone()
        })?;

        // The alert goes out after the lock is released, best effort only.
        if let Err(err) = self.notifier.send_alert("Emergency stop activated") {
            warn!(error = %err, "emergency alert failed");
        }
        Ok(motor)
    }

    /// Read-only snapshot of the current motor state.
    pub fn status(&self) -> Result<Motor, MotorError> {
        Ok(self.store.get()?)
    }
}

// ============================================================================
// Tests
// ============================================================================
