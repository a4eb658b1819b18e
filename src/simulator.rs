//! Fixed-step simulation tick.
//!
//! One tick advances one constant-size physics step. The step size is
//! deliberately decoupled from how often the driver polls: the driver can
//! run faster or slower in wall-clock terms without changing what a single
//! step means to the model.

use std::sync::Arc;

use crate::clock;
use crate::motor::Overheat;
use crate::store::{MotorStore, StoreError};

/// Simulated seconds advanced per tick.
pub const SIM_DT_S: f64 = 0.1;

/// Advances the motor by one physics step per [`Simulator::tick`] call.
#[derive(Debug, Clone)]
pub struct Simulator {
    store: Arc<MotorStore>,
    dt_s: f64,
}

impl Simulator {
    /// Simulator over the given store with the standard step size.
    pub fn new(store: Arc<MotorStore>) -> Self {
        Self {
            store,
            dt_s: SIM_DT_S,
        }
    }

    /// Override the step size.
    pub fn with_dt(mut self, dt_s: f64) -> Self {
        self.dt_s = dt_s;
        self
    }

    /// Run one tick: read, advance, write back, as one critical section.
    ///
    /// The overheat condition raised by the step passes through untouched;
    /// what to do about it is the caller's decision.
    pub fn tick(&self) -> Result<Option<Overheat>, StoreError> {
        let now_ms = clock::unix_ms();
        self.store.with(|motor| motor.advance(self.dt_s, now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::{Motor, MotorStatus};

    fn seeded_store() -> Arc<MotorStore> {
        Arc::new(MotorStore::new(Motor::new(0)))
    }

    #[test]
    fn tick_advances_one_fixed_step() {
        let store = seeded_store();
        store.with(|m| m.set_speed(60.0, 0).unwrap()).unwrap();

        Simulator::new(Arc::clone(&store)).tick().unwrap();

        let motor = store.get().unwrap();
        assert!((motor.current_speed - 0.2).abs() < 1e-9);
        assert_eq!(motor.status, MotorStatus::Starting);
    }

    #[test]
    fn custom_step_size_is_used() {
        let store = seeded_store();
        store.with(|m| m.set_speed(60.0, 0).unwrap()).unwrap();

        Simulator::new(Arc::clone(&store)).with_dt(0.5).tick().unwrap();

        assert!((store.get().unwrap().current_speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tick_propagates_overheat() {
        let store = seeded_store();
        store
            .with(|m| {
                m.current_speed = 80.0;
                m.target_speed = 80.0;
                m.temperature = 95.0;
                m.status = MotorStatus::Running;
            })
            .unwrap();

        let overheat = Simulator::new(Arc::clone(&store))
            .tick()
            .unwrap()
            .expect("clamp must trip");
        assert!((overheat.clamped_speed - 20.0).abs() < 1e-9);
        assert_eq!(store.get().unwrap().status, MotorStatus::Overheating);
    }

    #[test]
    fn tick_stamps_wall_clock() {
        let store = seeded_store();
        Simulator::new(Arc::clone(&store)).tick().unwrap();
        assert!(store.get().unwrap().last_updated > 1_600_000_000_000);
    }
}
