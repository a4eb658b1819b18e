//! Single-slot owner of the motor aggregate.
//!
//! Exactly one [`Motor`] exists per process and this store owns it. Every
//! other component works on snapshots or short closures run under the lock;
//! there is no finer-grained locking anywhere else in the crate.

use std::sync::Mutex;

use thiserror::Error;

use crate::motor::Motor;

/// Failure to reach the slot.
///
/// The only way this can happen is a thread panicking while it held the
/// lock; callers treat it as the store being unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The state lock was poisoned by a panic in another thread.
    #[error("state lock poisoned")]
    Poisoned,
}

/// Thread-safe single-slot holder of the one [`Motor`].
///
/// Commands and the simulation tick both funnel through [`MotorStore::with`],
/// which serializes an entire read-modify-write cycle as one critical
/// section. `get`/`put` expose the plain snapshot-and-replace contract for
/// callers that only need one side; last write wins, no history is kept.
#[derive(Debug)]
pub struct MotorStore {
    slot: Mutex<Motor>,
}

impl MotorStore {
    /// Seed the store with its motor.
    pub fn new(motor: Motor) -> Self {
        Self {
            slot: Mutex::new(motor),
        }
    }

    /// Cloned snapshot of the current state.
    pub fn get(&self) -> Result<Motor, StoreError> {
        let slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.clone())
    }

    /// Replace the state wholesale.
    pub fn put(&self, motor: Motor) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = motor;
        Ok(())
    }

    /// Run a closure against the state under the lock.
    ///
    /// Keep closures short and non-blocking; in particular, notifier calls
    /// must happen after this returns, never inside it.
    pub fn with<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Motor) -> R,
    {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut slot))
    }
}
