//! Wall-clock access for the service layer.
//!
//! The motor aggregate takes `now_ms` parameters instead of reading time
//! itself; this is the one place the real clock comes from.

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the Unix epoch.
pub fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_ms_is_past_2020() {
        assert!(unix_ms() > 1_600_000_000_000);
    }
}
