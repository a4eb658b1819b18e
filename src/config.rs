//! Service configuration.
//!
//! Defaults are tuned for local development; `with_*` builders cover
//! embedding in tests and tools, and `MOTORD_*` environment variables
//! override them at deployment time.
//!
//! # Example
//!
//! ```rust
//! use motord::config::{Config, DriverConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_web(WebConfig::default().with_port(3000))
//!     .with_driver(DriverConfig::default().with_poll_interval_ms(50));
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Main Config
// ============================================================================

/// Complete service configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Web server configuration
    pub web: WebConfig,
    /// Driver loop cadence configuration
    pub driver: DriverConfig,
}

impl Config {
    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set driver configuration
    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Defaults overridden from `MOTORD_*` environment variables.
    ///
    /// Recognized: `MOTORD_PORT`, `MOTORD_HUB_PATH`, `MOTORD_CORS`,
    /// `MOTORD_POLL_MS`, `MOTORD_BROADCAST_EVERY`. Unset or unparsable
    /// values keep their default.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(port) = env_parse("MOTORD_PORT") {
            config.web.port = port;
        }
        if let Some(path) = std::env::var("MOTORD_HUB_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
        {
            config.web.hub_path = path;
        }
        if let Some(permissive) = env_parse("MOTORD_CORS") {
            config.web.cors_permissive = permissive;
        }
        if let Some(interval_ms) = env_parse::<u64>("MOTORD_POLL_MS") {
            config.driver.poll_interval_ms = interval_ms.max(1);
        }
        if let Some(every) = env_parse::<u64>("MOTORD_BROADCAST_EVERY") {
            config.driver.broadcast_every = every.max(1);
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Route the WebSocket telemetry hub mounts on
    pub hub_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_permissive: true,
            hub_path: "/motorhub".to_string(),
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Set the WebSocket hub route
    pub fn with_hub_path(mut self, path: &str) -> Self {
        self.hub_path = path.to_string();
        self
    }
}

// ============================================================================
// Driver Config
// ============================================================================

/// Driver loop cadence configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Wall-clock milliseconds between simulation steps
    pub poll_interval_ms: u64,
    /// Broadcast one telemetry frame every this many steps
    pub broadcast_every: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            broadcast_every: 20,
        }
    }
}

impl DriverConfig {
    /// Set the poll interval, clamped to at least 1 ms
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms.max(1);
        self
    }

    /// Set the broadcast decimation, clamped to at least every step
    pub fn with_broadcast_every(mut self, every: u64) -> Self {
        self.broadcast_every = every.max(1);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.web.port, 5000);
        assert!(config.web.cors_permissive);
        assert_eq!(config.web.hub_path, "/motorhub");
        assert_eq!(config.driver.poll_interval_ms, 100);
        assert_eq!(config.driver.broadcast_every, 20);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_web(
                WebConfig::default()
                    .with_port(9000)
                    .with_cors(false)
                    .with_hub_path("/telemetry"),
            )
            .with_driver(
                DriverConfig::default()
                    .with_poll_interval_ms(50)
                    .with_broadcast_every(5),
            );

        assert_eq!(config.web.port, 9000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.web.hub_path, "/telemetry");
        assert_eq!(config.driver.poll_interval_ms, 50);
        assert_eq!(config.driver.broadcast_every, 5);
    }

    #[test]
    fn cadence_values_clamped() {
        let driver = DriverConfig::default()
            .with_poll_interval_ms(0)
            .with_broadcast_every(0);
        assert_eq!(driver.poll_interval_ms, 1);
        assert_eq!(driver.broadcast_every, 1);
    }

    #[test]
    fn config_serializes_round_trip() {
        let config = Config::default().with_web(WebConfig::default().with_port(8081));
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.web.port, 8081);
        assert_eq!(back.driver.broadcast_every, 20);
    }

    // =========================================================================
    // Environment Override Tests
    // =========================================================================

    // Single test because the process environment is shared across the
    // parallel test runner.
    #[test]
    fn env_overrides() {
        std::env::set_var("MOTORD_PORT", "9100");
        std::env::set_var("MOTORD_POLL_MS", "250");
        std::env::set_var("MOTORD_BROADCAST_EVERY", "0");
        std::env::set_var("MOTORD_CORS", "false");
        std::env::set_var("MOTORD_HUB_PATH", "/live");

        let config = Config::from_env();
        assert_eq!(config.web.port, 9100);
        assert_eq!(config.driver.poll_interval_ms, 250);
        assert_eq!(config.driver.broadcast_every, 1);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.web.hub_path, "/live");

        // Unparsable values fall back to the defaults.
        std::env::set_var("MOTORD_PORT", "not-a-port");
        std::env::set_var("MOTORD_HUB_PATH", "missing-leading-slash");
        std::env::remove_var("MOTORD_POLL_MS");
        std::env::remove_var("MOTORD_BROADCAST_EVERY");
        std::env::remove_var("MOTORD_CORS");

        let config = Config::from_env();
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.web.hub_path, "/motorhub");
        assert_eq!(config.driver.poll_interval_ms, 100);

        std::env::remove_var("MOTORD_PORT");
        std::env::remove_var("MOTORD_HUB_PATH");
    }
}
