// Command-line configuration of the primary logger
// Level and encoder flags, bound onto a FlagSet or flattened into a clap derive parser.

use crate::config::{BuildError, Config, TimeEncoding};
use crate::encoding::Encoding;
use crate::flags::{FlagError, FlagSet, FlagValue, ValueError};
use crate::legacy;
use crate::level::{Level, LevelEncoder, verbosity_level_name};
use crate::logger::Logger;
use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_LEVEL_FLAG: &str = "zap-log-level";
pub const DEFAULT_ENCODER_FLAG: &str = "zap-encoder";

/// Level flag value. Accepts a level name or a non-negative verbosity number.
#[derive(Debug, Clone, Default)]
pub struct LevelFlag(Rc<Cell<Level>>);

impl LevelFlag {
    pub fn new(level: Level) -> Self {
        LevelFlag(Rc::new(Cell::new(level)))
    }

    pub fn get(&self) -> Level {
        self.0.get()
    }

    pub fn replace(&self, level: Level) {
        self.0.set(level);
    }
}

impl FlagValue for LevelFlag {
    fn set(&mut self, value: &str) -> Result<(), ValueError> {
        self.0.set(value.parse::<Level>()?);
        Ok(())
    }

    fn render(&self) -> String {
        self.get().flag_text()
    }

    fn type_name(&self) -> &'static str {
        "level"
    }
}

/// Encoder flag value. Accepts `json` or `console`.
#[derive(Debug, Clone, Default)]
pub struct EncoderFlag(Rc<Cell<Encoding>>);

impl EncoderFlag {
    pub fn new(encoding: Encoding) -> Self {
        EncoderFlag(Rc::new(Cell::new(encoding)))
    }

    pub fn get(&self) -> Encoding {
        self.0.get()
    }

    pub fn replace(&self, encoding: Encoding) {
        self.0.set(encoding);
    }
}

impl FlagValue for EncoderFlag {
    fn set(&mut self, value: &str) -> Result<(), ValueError> {
        self.0.set(value.parse::<Encoding>()?);
        Ok(())
    }

    fn render(&self) -> String {
        self.get().to_string()
    }

    fn type_name(&self) -> &'static str {
        "encoder"
    }
}

/// Which flags configure the logger, and the values they were parsed into.
#[derive(Debug, Clone)]
pub struct FlagConfig {
    /// Flag name for the level.
    pub level_name: String,
    /// Flag name for the encoding.
    pub encoder_name: String,

    level: LevelFlag,
    encoder: EncoderFlag,
}

impl Default for FlagConfig {
    fn default() -> Self {
        FlagConfig::new()
    }
}

impl FlagConfig {
    pub fn new() -> Self {
        FlagConfig {
            level_name: DEFAULT_LEVEL_FLAG.to_string(),
            encoder_name: DEFAULT_ENCODER_FLAG.to_string(),
            level: LevelFlag::default(),
            encoder: EncoderFlag::default(),
        }
    }

    /// Register both flags on `flags`. Until they are parsed, the level is `info` and
    /// the encoding is `console`.
    pub fn bind(&mut self, flags: &mut FlagSet) -> Result<(), FlagError> {
        self.level.replace(Level::INFO);
        self.encoder.replace(Encoding::Console);

        flags.var(
            self.level.clone(),
            &self.level_name,
            "Zap level to configure the verbosity of logging.",
        )?;
        flags.var(
            self.encoder.clone(),
            &self.encoder_name,
            "Zap log encoding (one of 'json' or 'console')",
        )
    }

    pub fn level(&self) -> Level {
        self.level.get()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoder.get()
    }

    /// Override the level and encoding of `config` with the flag values.
    pub fn apply(&self, mut config: Config) -> Config {
        config.level = self.level();
        config.encoding = self.encoding();
        config
    }

    /// Production configuration with ISO-8601 timestamps, `lvl-N` rendering for custom
    /// verbosity tiers, and the level and encoding from the flags.
    ///
    /// Sampling is on, so bursts of identical entries may be dropped.
    pub fn get_config(&self) -> Config {
        primary_config(self.level(), self.encoding())
    }

    /// Build the primary logger from [`FlagConfig::get_config`].
    pub fn build_primary(&self) -> Result<Logger, BuildError> {
        self.get_config().build()
    }
}

fn primary_config(level: Level, encoding: Encoding) -> Config {
    let mut config = Config::production();
    config.encoder.time_encoding = TimeEncoding::Iso8601;
    config.encoder.level_encoder = LevelEncoder::Custom(verbosity_level_name);
    config.level = level;
    config.encoding = encoding;
    config
}

/// The same flags for clap derive parsers, meant for `#[command(flatten)]`.
#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Zap level to configure the verbosity of logging
    #[arg(long = "zap-log-level", value_name = "LEVEL", default_value = "info")]
    pub level: Level,

    /// Zap log encoding
    #[arg(
        long = "zap-encoder",
        value_name = "ENCODER",
        value_enum,
        ignore_case = true,
        default_value = "console"
    )]
    pub encoding: Encoding,

    /// Number for the log level verbosity of the legacy log facade
    #[arg(
        short = 'v',
        long = "v",
        value_name = "INT",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=128)
    )]
    pub verbosity: u8,
}

impl LogArgs {
    pub fn get_config(&self) -> Config {
        primary_config(self.level, self.encoding)
    }

    pub fn build_primary(&self) -> Result<Logger, BuildError> {
        self.get_config().build()
    }

    /// Build the legacy facade logger from `base` and the parsed `-v` value.
    pub fn build_for_legacy(&self, base: Config) -> Result<Logger, BuildError> {
        legacy::verbosity_config(base, self.verbosity).build()
    }
}
