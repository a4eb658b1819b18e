//! Typed command failures.
//!
//! Validation problems come back as values, never as panics or control-flow
//! exceptions; the HTTP layer maps them onto status codes. The message texts
//! are user-facing and appear verbatim in API responses.

use thiserror::Error;

use crate::store::StoreError;

/// Reasons a motor command can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotorError {
    /// Requested speed falls outside the commandable range.
    #[error("Invalid speed value: {speed}. Speed must be between 0 and 100.")]
    InvalidSpeed {
        /// The rejected value
        speed: f64,
    },

    /// Speed commands are locked out while the emergency cooldown runs.
    #[error("Motor in emergency cooldown. Wait {remaining_secs} more seconds.")]
    CooldownActive {
        /// Whole seconds until speed commands are accepted again
        remaining_secs: u64,
    },

    /// The motor state store could not be reached.
    #[error("Motor store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl MotorError {
    /// Whether this is a client-side validation failure, as opposed to an
    /// internal one. Validation failures map to 400 at the HTTP boundary.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MotorError::InvalidSpeed { .. } | MotorError::CooldownActive { .. }
        )
    }
}
