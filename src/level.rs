// Signed logging level scale
// Named levels sit at -1 and above; everything below is a custom verbosity tier.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest verbosity accepted from textual input (`"128"` is stored as `-128`).
pub const MAX_VERBOSITY: i64 = 128;

/// A logging level. Higher values are more severe.
///
/// `-1` through `5` carry names (`debug` .. `fatal`). Lower values are custom verbosity
/// tiers: verbosity `N` is stored as `-N`, so more verbose means less severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Level(i8);

impl Level {
    pub const DEBUG: Level = Level(-1);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(1);
    pub const ERROR: Level = Level(2);
    pub const DPANIC: Level = Level(3);
    pub const PANIC: Level = Level(4);
    pub const FATAL: Level = Level(5);

    pub const fn new(value: i8) -> Self {
        Level(value)
    }

    /// The level for verbosity tier `verbosity`, saturating at `-128`.
    pub const fn verbosity(verbosity: u8) -> Self {
        let v = if verbosity > 128 { 128 } else { verbosity as i16 };
        Level((-v) as i8)
    }

    pub const fn get(self) -> i8 {
        self.0
    }

    /// Canonical name, if this level is one of the named levels.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            -1 => Some("debug"),
            0 => Some("info"),
            1 => Some("warn"),
            2 => Some("error"),
            3 => Some("dpanic"),
            4 => Some("panic"),
            5 => Some("fatal"),
            _ => None,
        }
    }

    pub fn is_named(self) -> bool {
        self.name().is_some()
    }

    /// Text that parses back into this level: the name, or the verbosity number.
    pub fn flag_text(self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => (-(self.0 as i16)).to_string(),
        }
    }

    /// Closest `tracing` level. Every custom tier collapses onto `TRACE`.
    pub fn to_tracing(self) -> tracing::Level {
        match self.0 {
            2..=i8::MAX => tracing::Level::ERROR,
            1 => tracing::Level::WARN,
            0 => tracing::Level::INFO,
            -1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Maximum `log` filter that lets this level and everything more severe through.
    pub fn to_log_filter(self) -> log::LevelFilter {
        match self.0 {
            2..=i8::MAX => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            0 => log::LevelFilter::Info,
            -1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::ERROR
        } else if level == tracing::Level::WARN {
            Level::WARN
        } else if level == tracing::Level::INFO {
            Level::INFO
        } else if level == tracing::Level::DEBUG {
            Level::DEBUG
        } else {
            Level::verbosity(2)
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::ERROR,
            log::Level::Warn => Level::WARN,
            log::Level::Info => Level::INFO,
            log::Level::Debug => Level::DEBUG,
            log::Level::Trace => Level::verbosity(2),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level({})", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid log level \"{0}\"")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();

        let named = match lower.as_str() {
            "debug" => Some(Level::DEBUG),
            "info" | "" => Some(Level::INFO),
            "warn" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            "dpanic" => Some(Level::DPANIC),
            "panic" => Some(Level::PANIC),
            "fatal" => Some(Level::FATAL),
            _ => None,
        };
        if let Some(level) = named {
            return Ok(level);
        }

        // Not a name, try a verbosity number
        match lower.parse::<i64>() {
            Ok(n) if (0..=MAX_VERBOSITY).contains(&n) => Ok(Level((-n) as i8)),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.flag_text()
    }
}

/// Function rendering a level into the text written to the log line.
pub type LevelEncodeFn = fn(Level) -> Cow<'static, str>;

/// How a level is rendered in output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelEncoder {
    #[default]
    Lowercase,
    Capital,
    #[serde(skip)]
    Custom(LevelEncodeFn),
}

impl LevelEncoder {
    pub fn is_custom(&self) -> bool {
        matches!(self, LevelEncoder::Custom(_))
    }

    pub fn encode(&self, level: Level) -> Cow<'static, str> {
        match self {
            LevelEncoder::Lowercase => lowercase_level_name(level),
            LevelEncoder::Capital => match lowercase_level_name(level) {
                Cow::Borrowed(name) => Cow::Owned(name.to_uppercase()),
                Cow::Owned(name) => Cow::Owned(name.to_uppercase()),
            },
            LevelEncoder::Custom(encode) => encode(level),
        }
    }
}

fn lowercase_level_name(level: Level) -> Cow<'static, str> {
    match level.name() {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(level.to_string()),
    }
}

/// Renders named levels by name and custom verbosity tiers as `lvl-N`.
pub fn verbosity_level_name(level: Level) -> Cow<'static, str> {
    match level.name() {
        Some(name) => Cow::Borrowed(name),
        None if level.get() < Level::DEBUG.get() => Cow::Owned(format!("lvl{}", level.get())),
        None => Cow::Owned(level.to_string()),
    }
}
