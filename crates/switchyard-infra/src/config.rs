//! Configuration loader for Switchyard.
//!
//! Reads a TOML file (`~/.switchyard/config.toml` unless a path is given) and
//! deserializes it into [`SwitchyardConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use switchyard_types::config::SwitchyardConfig;

/// Resolve the config file path.
///
/// An explicit path (from `--config` or `SWITCHYARD_CONFIG`) wins; otherwise
/// `~/.switchyard/config.toml`, or `.switchyard/config.toml` when there is no
/// home directory.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".switchyard").join("config.toml");
    }

    PathBuf::from(".switchyard").join("config.toml")
}

/// A loaded configuration plus the problems found while loading it.
///
/// Loading happens before the tracing subscriber exists, so problems are
/// collected here and logged by the caller once logging is up.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SwitchyardConfig,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    fn defaults(warning: Option<String>) -> Self {
        Self {
            config: SwitchyardConfig::default(),
            warnings: warning.into_iter().collect(),
        }
    }

    /// Emit every collected warning through `tracing`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
    }
}

/// Load configuration from `path`.
///
/// - Missing file: returns [`SwitchyardConfig::default()`] with no warnings.
/// - Unreadable or unparsable file: returns the default with a warning.
/// - Otherwise returns the parsed config with failure rates clamped to `[0, 1]`.
pub async fn load_config(path: &Path) -> LoadedConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return LoadedConfig::defaults(None);
        }
        Err(err) => {
            return LoadedConfig::defaults(Some(format!(
                "failed to read {}: {err}, using defaults",
                path.display()
            )));
        }
    };

    match toml::from_str::<SwitchyardConfig>(&content) {
        Ok(mut config) => {
            let warnings = clamp_rates(&mut config);
            LoadedConfig { config, warnings }
        }
        Err(err) => LoadedConfig::defaults(Some(format!(
            "failed to parse {}: {err}, using defaults",
            path.display()
        ))),
    }
}

/// Clamp failure rates into `[0, 1]`, returning a warning per adjusted value.
pub fn clamp_rates(config: &mut SwitchyardConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    config.event.start_failure_rate = clamp_rate(
        "event.start_failure_rate",
        config.event.start_failure_rate,
        &mut warnings,
    );
    config.event.message_failure_rate = clamp_rate(
        "event.message_failure_rate",
        config.event.message_failure_rate,
        &mut warnings,
    );
    warnings
}

fn clamp_rate(key: &str, rate: f64, warnings: &mut Vec<String>) -> f64 {
    if rate.is_nan() {
        warnings.push(format!("{key} is NaN, using 0"));
        return 0.0;
    }
    let clamped = rate.clamp(0.0, 1.0);
    if clamped != rate {
        warnings.push(format!("{key} = {rate} out of range, clamped to {clamped}"));
    }
    clamped
}
