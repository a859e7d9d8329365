//! Configuration types for Switchyard.
//!
//! `SwitchyardConfig` represents the top-level `config.toml`. Every section
//! and field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchyardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub event: EventConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the event worker component behind the root route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Bus address the worker consumes and the root route sends to.
    #[serde(default = "default_event_address")]
    pub address: String,

    /// Probability in `[0, 1]` that the worker fails to start.
    #[serde(default = "default_start_failure_rate")]
    pub start_failure_rate: f64,

    /// Probability in `[0, 1]` that the worker fails an individual message.
    #[serde(default = "default_message_failure_rate")]
    pub message_failure_rate: f64,

    /// Delay before the worker replies. Zero replies inline.
    #[serde(default)]
    pub reply_delay_ms: u64,
}

fn default_event_address() -> String {
    "event.verticle".to_string()
}

fn default_start_failure_rate() -> f64 {
    0.5
}

fn default_message_failure_rate() -> f64 {
    0.6666
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            address: default_event_address(),
            start_failure_rate: default_start_failure_rate(),
            message_failure_rate: default_message_failure_rate(),
            reply_delay_ms: 0,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = SwitchyardConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.event.address, "event.verticle");
        assert!((config.event.start_failure_rate - 0.5).abs() < f64::EPSILON);
        assert!((config.event.message_failure_rate - 0.6666).abs() < f64::EPSILON);
        assert_eq!(config.event.reply_delay_ms, 0);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: SwitchyardConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.event.address, "event.verticle");
    }

    #[test]
    fn test_config_deserialize_partial_sections() {
        let toml_str = r#"
[server]
port = 9090

[event]
message_failure_rate = 0.0
reply_delay_ms = 25

[logging]
json = true
"#;
        let config: SwitchyardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.event.address, "event.verticle");
        assert!((config.event.start_failure_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.event.message_failure_rate, 0.0);
        assert_eq!(config.event.reply_delay_ms, 25);
        assert!(config.logging.json);
        assert!(!config.logging.otel);
    }
}
