//! Pipeline configuration.

use crate::report::DEFAULT_SNAPSHOT_CAP;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of processed frames that defines "enough frames observed".
    pub target_frames: u64,
    /// Maximum failing frames retained as snapshots.
    pub snapshot_cap: usize,
    /// Upper bound on the final flush during `finish()`, in milliseconds.
    ///
    /// Kept short: `finish()` runs during test teardown, where indefinite
    /// blocking would hang the whole suite.
    pub flush_timeout_ms: u64,
    /// Bound on the producer-to-worker frame queue; `None` is unbounded.
    ///
    /// When a bounded queue is full, further deliveries are refused and the
    /// frame is handed straight back to the capture source. The producer
    /// callback is never blocked either way.
    #[serde(default)]
    pub channel_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_frames: 100,
            snapshot_cap: DEFAULT_SNAPSHOT_CAP,
            flush_timeout_ms: 10_000,
            channel_capacity: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration for the given frame target.
    pub fn with_target(target_frames: u64) -> Self {
        Self {
            target_frames,
            ..Default::default()
        }
    }

    /// Returns the flush timeout as a [`Duration`].
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_frames == 0 {
            return Err(ConfigError::InvalidTargetFrames);
        }
        if self.flush_timeout_ms == 0 {
            return Err(ConfigError::InvalidFlushTimeout);
        }
        if self.channel_capacity == Some(0) {
            return Err(ConfigError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("target frame count must be at least 1")]
    InvalidTargetFrames,
    #[error("flush timeout must be nonzero")]
    InvalidFlushTimeout,
    #[error("channel capacity must be at least 1 when bounded")]
    InvalidChannelCapacity,
    #[error("invalid capture dimensions")]
    InvalidDimensions,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Capture-side settings used by the demo binary's mock source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Producer frame interval in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_interval_ms: 16,
        }
    }
}

impl CaptureSettings {
    /// Validates the capture settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub capture: CaptureSettings,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.pipeline.validate()?;
        config.capture.validate()?;
        Ok(config)
    }
}
