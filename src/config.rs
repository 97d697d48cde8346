// Logger configuration
// Presets, TOML loading, validation, and construction of a Logger.

use crate::encoding::Encoding;
use crate::level::{Level, LevelEncoder};
use crate::logger::Logger;
use crate::sink::{Sink, Sinks};
use chrono::Offset as _;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no output paths configured")]
    NoOutputPaths,

    #[error("sampling tick must be greater than 0")]
    InvalidSamplingTick,

    #[error("couldn't open sink \"{path}\": {source}")]
    OpenSink {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),
}

/// Timestamp rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum TimeEncoding {
    /// Floating-point seconds since the Unix epoch.
    #[default]
    Epoch,
    /// Local time, millisecond precision, e.g. `2022-03-04T15:04:05.000-0500`. A zero
    /// offset is written as `Z`.
    Iso8601,
    Rfc3339,
}

impl TimeEncoding {
    /// Encode `now` as the value written to the time element.
    pub fn encode<Tz>(self, now: chrono::DateTime<Tz>) -> serde_json::Value
    where
        Tz: chrono::TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            TimeEncoding::Epoch => {
                let secs = now.timestamp_micros() as f64 / 1_000_000.0;
                serde_json::Value::from(secs)
            }
            TimeEncoding::Iso8601 => {
                let layout = if now.offset().fix().local_minus_utc() == 0 {
                    "%Y-%m-%dT%H:%M:%S%.3fZ"
                } else {
                    "%Y-%m-%dT%H:%M:%S%.3f%z"
                };
                serde_json::Value::from(now.format(layout).to_string())
            }
            TimeEncoding::Rfc3339 => serde_json::Value::from(now.to_rfc3339()),
        }
    }
}

/// Keys and rendering choices for each log entry. An empty key leaves that element out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub line_ending: String,
    /// Leave the line ending off every entry.
    pub skip_line_ending: bool,
    pub time_encoding: TimeEncoding,
    #[serde(skip_serializing_if = "LevelEncoder::is_custom")]
    pub level_encoder: LevelEncoder,
}

impl EncoderConfig {
    pub fn production() -> Self {
        EncoderConfig {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            line_ending: "\n".to_string(),
            skip_line_ending: false,
            time_encoding: TimeEncoding::Epoch,
            level_encoder: LevelEncoder::Lowercase,
        }
    }

    pub fn development() -> Self {
        EncoderConfig {
            message_key: "M".to_string(),
            level_key: "L".to_string(),
            time_key: "T".to_string(),
            name_key: "N".to_string(),
            caller_key: "C".to_string(),
            line_ending: "\n".to_string(),
            skip_line_ending: false,
            time_encoding: TimeEncoding::Iso8601,
            level_encoder: LevelEncoder::Capital,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig::production()
    }
}

/// Per-tick sampling: the first `initial` entries with the same level and message are
/// logged, then every `thereafter`-th one. Counters reset every `tick_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub initial: u64,
    pub thereafter: u64,
    pub tick_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            initial: 100,
            thereafter: 100,
            tick_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub level: Level,
    pub encoding: Encoding,
    /// `stdout`, `stderr`, or a file path opened for appending.
    pub output_paths: Vec<String>,
    pub sampling: Option<SamplingConfig>,
    pub encoder: EncoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config::production()
    }
}

impl Config {
    /// Info level, JSON, sampled, epoch timestamps, written to stderr.
    pub fn production() -> Self {
        Config {
            level: Level::INFO,
            encoding: Encoding::Json,
            output_paths: vec!["stderr".to_string()],
            sampling: Some(SamplingConfig::default()),
            encoder: EncoderConfig::production(),
        }
    }

    /// Debug level, console, unsampled, ISO-8601 timestamps, written to stderr.
    pub fn development() -> Self {
        Config {
            level: Level::DEBUG,
            encoding: Encoding::Console,
            output_paths: vec!["stderr".to_string()],
            sampling: None,
            encoder: EncoderConfig::development(),
        }
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.output_paths.is_empty() {
            return Err(BuildError::NoOutputPaths);
        }

        if let Some(sampling) = &self.sampling {
            if sampling.tick_ms == 0 {
                return Err(BuildError::InvalidSamplingTick);
            }
        }

        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BuildError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Open the configured outputs and build a logger writing to them.
    pub fn build(&self) -> Result<Logger, BuildError> {
        self.validate()?;

        let sinks = self
            .output_paths
            .iter()
            .map(|path| Sink::open(path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Logger::new(self, Sinks::new(sinks)))
    }

    /// Build a logger writing to `writer` instead of the configured outputs.
    pub fn build_with_writer<W>(&self, writer: W) -> Result<Logger, BuildError>
    where
        W: Write + Send + 'static,
    {
        self.validate()?;

        Ok(Logger::new(self, Sinks::new(vec![Sink::writer(writer)])))
    }
}
