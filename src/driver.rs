//! Background driver loop.
//!
//! One long-lived task owns the simulation cadence: every poll interval it
//! advances the motor one step, then publishes telemetry on a decimated
//! schedule and raises an alert whenever the motor runs hot. Store or
//! notifier failures are logged and the loop keeps going; only the shutdown
//! channel stops it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::clock;
use crate::config::DriverConfig;
use crate::simulator::Simulator;
use crate::store::MotorStore;
use crate::telemetry::{Notifier, TelemetryFrame};

/// Long-lived task that advances the simulation and publishes telemetry.
pub struct MotorDriver<N: Notifier> {
    simulator: Simulator,
    store: Arc<MotorStore>,
    notifier: Arc<N>,
    config: DriverConfig,
}

impl<N: Notifier + 'static> MotorDriver<N> {
    /// Driver over the given simulator, store, and notifier.
    pub fn new(
        simulator: Simulator,
        store: Arc<MotorStore>,
        notifier: Arc<N>,
        config: DriverConfig,
    ) -> Self {
        Self {
            simulator,
            store,
            notifier,
            config,
        }
    }

    /// Run until the shutdown channel fires or closes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        let broadcast_every = self.config.broadcast_every.max(1);
        let mut ticks: u64 = 0;

        info!(
            poll_ms = self.config.poll_interval_ms,
            broadcast_every, "motor driver started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = interval.tick() => {}
            }
            ticks += 1;
            self.cycle(ticks, broadcast_every);
        }

        info!(ticks, "motor driver stopped");
    }

    fn cycle(&self, ticks: u64, broadcast_every: u64) {
        let overheat = match self.simulator.tick() {
            Ok(overheat) => overheat,
            Err(err) => {
                error!(error = %err, "simulation tick failed");
                return;
            }
        };

        let motor = match self.store.get() {
            Ok(motor) => motor,
            Err(err) => {
                error!(error = %err, "motor snapshot failed");
                return;
            }
        };

        let frame = TelemetryFrame::from_motor(&motor, clock::unix_ms());
        if ticks % broadcast_every == 0 {
            if let Err(err) = self.notifier.broadcast_telemetry(frame) {
                warn!(error = %err, "telemetry broadcast failed");
            }
        }

        // Alert on the tick that trips the protection and on every tick the
        // temperature stays past the threshold.
        if overheat.is_some() || motor.is_overheating() {
            warn!(
                temperature = motor.temperature,
                speed = motor.current_speed,
                "motor overheating"
            );
            let alert = format!(
                "CRITICAL: Motor overheating detected! Temperature: {:.1}°C",
                motor.temperature
            );
            if let Err(err) = self.notifier.send_alert(&alert) {
                warn!(error = %err, "overheat alert failed");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
