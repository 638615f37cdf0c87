//! Show configuration
//!
//! `jackpot.toml` is optional; every field has a default matching the
//! canonical jackpot show:
//!
//! ```toml
//! [sequence]
//! trigger_delay_ms = 50
//! linger_ms = 3000
//!
//! [stages]
//! reveal_timeout_ms = 2000
//! amount_timeout_ms = 900000
//! burst_timeout_ms = 3000
//! burst_settle_ms = 1500
//!
//! [counter]
//! from = 0
//! to = 9999
//! separator = ","
//! delay_ms = 0
//! direction = "up"
//!
//! [render]
//! fps = 60
//! ```
//!
//! A timeout of `0` means the stage is not bounded.

use jackpot_animation::tween::frame_duration;
use jackpot_animation::{CountDirection, CountUpConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the frame rate
pub const MAX_FPS: u32 = 240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),
}

// =============================================================================
// jackpot.toml
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct JackpotConfig {
    #[serde(default)]
    pub sequence: SequenceSection,
    #[serde(default)]
    pub stages: StagesSection,
    #[serde(default)]
    pub counter: CounterSection,
    #[serde(default)]
    pub render: RenderSection,
}

/// Trigger and playback timing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SequenceSection {
    /// Gap between a replay's reset and its start
    #[serde(default = "default_trigger_delay")]
    pub trigger_delay_ms: u64,
    /// How long the CLI keeps rendering after completion
    #[serde(default = "default_linger")]
    pub linger_ms: u64,
}

fn default_trigger_delay() -> u64 {
    50
}

fn default_linger() -> u64 {
    3000
}

impl Default for SequenceSection {
    fn default() -> Self {
        Self {
            trigger_delay_ms: default_trigger_delay(),
            linger_ms: default_linger(),
        }
    }
}

/// Per-stage timeouts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StagesSection {
    #[serde(default = "default_reveal_timeout")]
    pub reveal_timeout_ms: u64,
    #[serde(default = "default_amount_timeout")]
    pub amount_timeout_ms: u64,
    #[serde(default = "default_burst_timeout")]
    pub burst_timeout_ms: u64,
    /// Fixed wait after the burst launches
    #[serde(default = "default_burst_settle")]
    pub burst_settle_ms: u64,
}

fn default_reveal_timeout() -> u64 {
    2000
}

fn default_amount_timeout() -> u64 {
    900_000
}

fn default_burst_timeout() -> u64 {
    3000
}

fn default_burst_settle() -> u64 {
    1500
}

impl Default for StagesSection {
    fn default() -> Self {
        Self {
            reveal_timeout_ms: default_reveal_timeout(),
            amount_timeout_ms: default_amount_timeout(),
            burst_timeout_ms: default_burst_timeout(),
            burst_settle_ms: default_burst_settle(),
        }
    }
}

impl StagesSection {
    pub fn reveal_timeout(&self) -> Option<Duration> {
        bounded(self.reveal_timeout_ms)
    }

    pub fn amount_timeout(&self) -> Option<Duration> {
        bounded(self.amount_timeout_ms)
    }

    pub fn burst_timeout(&self) -> Option<Duration> {
        bounded(self.burst_timeout_ms)
    }

    pub fn burst_settle(&self) -> Duration {
        Duration::from_millis(self.burst_settle_ms)
    }
}

fn bounded(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterDirection {
    #[default]
    Up,
    Down,
}

impl From<CounterDirection> for CountDirection {
    fn from(direction: CounterDirection) -> Self {
        match direction {
            CounterDirection::Up => CountDirection::Up,
            CounterDirection::Down => CountDirection::Down,
        }
    }
}

/// Amount counter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CounterSection {
    #[serde(default)]
    pub from: f32,
    #[serde(default = "default_counter_to")]
    pub to: f32,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub direction: CounterDirection,
}

fn default_counter_to() -> f32 {
    9999.0
}

fn default_separator() -> String {
    ",".to_string()
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: default_counter_to(),
            separator: default_separator(),
            delay_ms: 0,
            direction: CounterDirection::Up,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    60
}

impl Default for RenderSection {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl RenderSection {
    pub fn frame(&self) -> Duration {
        frame_duration(self.fps)
    }
}

impl JackpotConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fps = self.render.fps;
        if fps == 0 || fps > MAX_FPS {
            return Err(ConfigError::Invalid(format!(
                "render.fps must be between 1 and {MAX_FPS}, got {fps}"
            )));
        }

        let counter = &self.counter;
        if !counter.from.is_finite() || !counter.to.is_finite() {
            return Err(ConfigError::Invalid("counter bounds must be finite".to_string()));
        }
        if counter.from > counter.to {
            return Err(ConfigError::Invalid(format!(
                "counter.from ({}) is greater than counter.to ({})",
                counter.from, counter.to
            )));
        }
        Ok(())
    }

    /// Count-up parameters for the amount overlay
    pub fn count_up(&self) -> CountUpConfig {
        let counter = &self.counter;
        CountUpConfig {
            from: counter.from,
            to: counter.to,
            direction: counter.direction.into(),
            delay: Duration::from_millis(counter.delay_ms),
            separator: counter.separator.clone(),
            frame: self.render.frame(),
        }
    }

    pub fn trigger_delay(&self) -> Duration {
        Duration::from_millis(self.sequence.trigger_delay_ms)
    }

    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.sequence.linger_ms)
    }
}
