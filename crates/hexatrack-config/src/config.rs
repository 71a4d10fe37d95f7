// crates/hexatrack-config/src/config.rs
// ============================================================================
// Module: Hexatrack Configuration
// Description: Configuration loading and validation for pipeline stages.
// Purpose: Provide strict config parsing with hard limits and profiles.
// Dependencies: hexatrack-transport, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! A missing default file yields the built-in development profile; a missing
//! file named explicitly (argument or environment) is an error.
//!
//! Channel endpoints fall back to the environment profile:
//!
//! | Channel | Development | Production |
//! |---|---|---|
//! | `track_data` | `udp://127.0.0.1:15000` | `udp://239.1.1.1:9000` |
//! | `extrap_track_data` | `udp://127.0.0.1:15001` | `udp://239.1.1.2:9001` |
//! | `delay_calc_track_data` | `udp://127.0.0.1:15002` | `udp://239.1.1.5:9595` |
//! | `final_calc_track_data` | `udp://127.0.0.1:15003` | `udp://239.1.1.5:9597` |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use hexatrack_transport::Endpoint;
use hexatrack_transport::validate_group;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "hexatrack.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "HEXATRACK_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of one path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for any millisecond timeout.
pub(crate) const MAX_TIMEOUT_MS: u64 = 60_000;
/// Upper bound for queue and buffer sizes.
pub(crate) const MAX_QUEUE_CAPACITY: usize = 1_000_000;
/// Upper bound for input and output rates.
pub(crate) const MAX_FREQUENCY_HZ: f64 = 100_000.0;
/// Accepted log level names.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Hexatrack configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HexatrackConfig {
    /// Network profile for unset channel endpoints.
    #[serde(default)]
    pub environment: Environment,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Socket tuning.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Stage rates and queue sizes.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Per-message channel overrides.
    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl HexatrackConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order is `path`, then `HEXATRACK_CONFIG`, then
    /// `hexatrack.toml` in the working directory. When neither `path` nor the
    /// environment variable is set and the default file does not exist, the
    /// built-in defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.network.validate()?;
        self.pipeline.validate()?;
        for channel in Channel::ALL {
            self.channel(channel)?;
        }
        Ok(())
    }

    /// Resolves the endpoint and group for `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint or group is invalid.
    pub fn channel(&self, channel: Channel) -> Result<ResolvedChannel, ConfigError> {
        let overrides = self.channels.get(channel);
        let endpoint_text =
            overrides.endpoint.as_deref().unwrap_or_else(|| channel.default_endpoint(self.environment));
        let endpoint = endpoint_text.parse::<Endpoint>().map_err(|err| {
            ConfigError::Invalid(format!("channels.{}.endpoint: {err}", channel.as_str()))
        })?;
        let group = overrides.group.clone().unwrap_or_else(|| channel.default_group().to_string());
        validate_group(&group)
            .map_err(|err| ConfigError::Invalid(format!("channels.{}.group: {err}", channel.as_str())))?;
        Ok(ResolvedChannel {
            endpoint,
            group,
        })
    }
}

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Network profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Unicast loopback endpoints for a single host.
    #[default]
    Development,
    /// Multicast endpoints for a deployed network.
    Production,
}

impl Environment {
    /// Returns a stable label for the profile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn, or error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Validates the log level name.
    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Network
// ============================================================================

/// Socket tuning shared by all adapters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Receive poll timeout in milliseconds.
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    /// Time allowed for in-flight sends at shutdown, in milliseconds.
    #[serde(default)]
    pub linger_ms: u64,
    /// DISH receive buffer in messages; the oldest drop when it is full.
    #[serde(default = "default_receive_buffer")]
    pub receive_buffer: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: default_receive_timeout_ms(),
            linger_ms: 0,
            receive_buffer: default_receive_buffer(),
        }
    }
}

impl NetworkConfig {
    /// Returns the receive poll timeout.
    #[must_use]
    pub const fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Returns the shutdown linger period.
    #[must_use]
    pub const fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }

    /// Validates timeouts and buffer sizes.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout("network.receive_timeout_ms", self.receive_timeout_ms)?;
        if self.linger_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!("network.linger_ms must be at most {MAX_TIMEOUT_MS}")));
        }
        validate_capacity("network.receive_buffer", self.receive_buffer)
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Stage rates and queue sizes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Event queue capacity for queued stages.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Event queue idle wait in milliseconds.
    #[serde(default = "default_queue_wait_ms")]
    pub queue_wait_ms: u64,
    /// TrackData report rate in hertz.
    #[serde(default = "default_input_frequency_hz")]
    pub input_frequency_hz: f64,
    /// Extrapolated output rate in hertz.
    #[serde(default = "default_output_frequency_hz")]
    pub output_frequency_hz: f64,
    /// Pacing gap between extrapolated states; zero disables pacing.
    #[serde(default = "default_emit_interval_ms")]
    pub emit_interval_ms: u64,
    /// Samples in the first-hop delay moving average.
    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: usize,
    /// Queue capacity of the delay statistics adapter.
    #[serde(default = "default_statistics_queue_capacity")]
    pub statistics_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            queue_wait_ms: default_queue_wait_ms(),
            input_frequency_hz: default_input_frequency_hz(),
            output_frequency_hz: default_output_frequency_hz(),
            emit_interval_ms: default_emit_interval_ms(),
            moving_average_window: default_moving_average_window(),
            statistics_queue_capacity: default_statistics_queue_capacity(),
        }
    }
}

impl PipelineConfig {
    /// Returns the event queue idle wait.
    #[must_use]
    pub const fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }

    /// Returns the extrapolator pacing gap.
    #[must_use]
    pub const fn emit_interval(&self) -> Duration {
        Duration::from_millis(self.emit_interval_ms)
    }

    /// Validates rates, capacities, and timeouts.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_capacity("pipeline.queue_capacity", self.queue_capacity)?;
        validate_timeout("pipeline.queue_wait_ms", self.queue_wait_ms)?;
        validate_frequency("pipeline.input_frequency_hz", self.input_frequency_hz)?;
        validate_frequency("pipeline.output_frequency_hz", self.output_frequency_hz)?;
        if self.emit_interval_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "pipeline.emit_interval_ms must be at most {MAX_TIMEOUT_MS}"
            )));
        }
        validate_capacity("pipeline.moving_average_window", self.moving_average_window)?;
        validate_capacity("pipeline.statistics_queue_capacity", self.statistics_queue_capacity)
    }
}

// ============================================================================
// SECTION: Channels
// ============================================================================

/// The four pipeline message channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Publisher to stage A.
    TrackData,
    /// Stage A to stage B.
    ExtrapTrackData,
    /// Stage B to stage C.
    DelayCalcTrackData,
    /// Stage C to sinks.
    FinalCalcTrackData,
}

impl Channel {
    /// Every channel in pipeline order.
    pub const ALL: [Self; 4] =
        [Self::TrackData, Self::ExtrapTrackData, Self::DelayCalcTrackData, Self::FinalCalcTrackData];

    /// Returns the config table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrackData => "track_data",
            Self::ExtrapTrackData => "extrap_track_data",
            Self::DelayCalcTrackData => "delay_calc_track_data",
            Self::FinalCalcTrackData => "final_calc_track_data",
        }
    }

    /// Returns the default messaging group.
    #[must_use]
    pub const fn default_group(self) -> &'static str {
        match self {
            Self::TrackData => "TrackData",
            Self::ExtrapTrackData => "ExtrapTrackData",
            Self::DelayCalcTrackData => "DelayCalcTrackData",
            Self::FinalCalcTrackData => "FinalCalcTrackData",
        }
    }

    /// Returns the profile endpoint for `environment`.
    #[must_use]
    pub const fn default_endpoint(self, environment: Environment) -> &'static str {
        match (environment, self) {
            (Environment::Development, Self::TrackData) => "udp://127.0.0.1:15000",
            (Environment::Development, Self::ExtrapTrackData) => "udp://127.0.0.1:15001",
            (Environment::Development, Self::DelayCalcTrackData) => "udp://127.0.0.1:15002",
            (Environment::Development, Self::FinalCalcTrackData) => "udp://127.0.0.1:15003",
            (Environment::Production, Self::TrackData) => "udp://239.1.1.1:9000",
            (Environment::Production, Self::ExtrapTrackData) => "udp://239.1.1.2:9001",
            (Environment::Production, Self::DelayCalcTrackData) => "udp://239.1.1.5:9595",
            (Environment::Production, Self::FinalCalcTrackData) => "udp://239.1.1.5:9597",
        }
    }
}

/// Optional overrides for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Group override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Channel override tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelsConfig {
    /// TrackData channel.
    #[serde(default)]
    pub track_data: ChannelConfig,
    /// ExtrapTrackData channel.
    #[serde(default)]
    pub extrap_track_data: ChannelConfig,
    /// DelayCalcTrackData channel.
    #[serde(default)]
    pub delay_calc_track_data: ChannelConfig,
    /// FinalCalcTrackData channel.
    #[serde(default)]
    pub final_calc_track_data: ChannelConfig,
}

impl ChannelsConfig {
    /// Returns the overrides for `channel`.
    #[must_use]
    pub const fn get(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::TrackData => &self.track_data,
            Channel::ExtrapTrackData => &self.extrap_track_data,
            Channel::DelayCalcTrackData => &self.delay_calc_track_data,
            Channel::FinalCalcTrackData => &self.final_calc_track_data,
        }
    }
}

/// Endpoint and group after profile defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    /// Parsed endpoint.
    pub endpoint: Endpoint,
    /// Messaging group.
    pub group: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults. The flag is
/// true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Requires `1..=MAX_TIMEOUT_MS` milliseconds.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {MAX_TIMEOUT_MS}")));
    }
    Ok(())
}

/// Requires `1..=MAX_QUEUE_CAPACITY` entries.
fn validate_capacity(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {MAX_QUEUE_CAPACITY}")));
    }
    Ok(())
}

/// Requires a positive finite rate no larger than `MAX_FREQUENCY_HZ`.
fn validate_frequency(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 || value > MAX_FREQUENCY_HZ {
        return Err(ConfigError::Invalid(format!(
            "{field} must be positive, finite, and at most {MAX_FREQUENCY_HZ}"
        )));
    }
    Ok(())
}

/// Default log level.
fn default_log_level() -> String {
    "info".to_string()
}

/// Default receive poll timeout in milliseconds.
pub(crate) const fn default_receive_timeout_ms() -> u64 {
    100
}

/// Default receive high-water mark.
pub(crate) const fn default_receive_buffer() -> usize {
    1_000
}

/// Default event queue capacity.
pub(crate) const fn default_queue_capacity() -> usize {
    500
}

/// Default event queue idle wait in milliseconds.
pub(crate) const fn default_queue_wait_ms() -> u64 {
    100
}

/// Default report rate.
pub(crate) const fn default_input_frequency_hz() -> f64 {
    8.0
}

/// Default extrapolated output rate.
pub(crate) const fn default_output_frequency_hz() -> f64 {
    100.0
}

/// Default extrapolator pacing gap in milliseconds.
pub(crate) const fn default_emit_interval_ms() -> u64 {
    10
}

/// Default moving average window.
pub(crate) const fn default_moving_average_window() -> usize {
    100
}

/// Default delay statistics queue capacity.
pub(crate) const fn default_statistics_queue_capacity() -> usize {
    200
}

// ============================================================================
// SECTION: Tests
// ============================================================================
