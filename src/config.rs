//! Simulator configuration.

use crate::strategy::StrategyKind;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding [`SimulatorConfig::engine_url`].
pub const ENGINE_URL_ENV: &str = "STRICTLY_SIM_ENGINE_URL";
/// Environment variable overriding [`SimulatorConfig::port`].
pub const PORT_ENV: &str = "STRICTLY_SIM_PORT";

/// Configuration for the simulation service.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Host to bind the HTTP API to.
    host: String,

    /// Port to bind the HTTP API to.
    port: u16,

    /// Base URL of a remote game engine. `None` plays against the
    /// in-process engine.
    engine_url: Option<String>,

    /// Strategy for sessions created without one.
    default_strategy: StrategyKind,

    /// Deadline for each engine call, in milliseconds.
    request_timeout_ms: u64,

    /// Deadline for a whole simulation, in milliseconds. Zero disables it.
    simulation_timeout_ms: u64,

    /// Strategies sessions may use.
    enabled_strategies: Vec<StrategyKind>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            engine_url: None,
            default_strategy: StrategyKind::default(),
            request_timeout_ms: 10_000,
            simulation_timeout_ms: 60_000,
            enabled_strategies: vec![
                StrategyKind::Random,
                StrategyKind::RuleBased,
                StrategyKind::Ai,
            ],
        }
    }
}

impl SimulatorConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies [`ENGINE_URL_ENV`] and [`PORT_ENV`] if set.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies environment-style overrides read through `lookup`.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENGINE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(%url, "Engine URL overridden from environment");
            self.engine_url = Some(url);
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid {}={:?}: {}", PORT_ENV, port, e)))?;
            debug!(port = self.port, "Port overridden from environment");
        }
        Ok(self)
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the remote engine URL.
    pub fn with_engine_url(mut self, engine_url: impl Into<String>) -> Self {
        self.engine_url = Some(engine_url.into());
        self
    }

    /// Per-call engine deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whole-simulation deadline, if enabled.
    pub fn simulation_timeout(&self) -> Option<Duration> {
        (self.simulation_timeout_ms > 0).then(|| Duration::from_millis(self.simulation_timeout_ms))
    }

    /// Address string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::new("request_timeout_ms must be positive".to_string()));
        }
        if self.enabled_strategies.is_empty() {
            return Err(ConfigError::new("enabled_strategies must not be empty".to_string()));
        }
        if !self.enabled_strategies.contains(&self.default_strategy) {
            warn!(default = %self.default_strategy, "Default strategy is not enabled");
            return Err(ConfigError::new(format!(
                "default_strategy {} is not in enabled_strategies",
                self.default_strategy
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
