// Legacy `log` facade support
// Derives a logger for crates that log through the `log` facade, whose verbosity comes
// from an integer `v` flag, and routes their records into it.

use crate::config::{BuildError, Config};
use crate::encoding::Encoding;
use crate::flags::FlagSet;
use crate::level::{Level, MAX_VERBOSITY};
use crate::logger::Logger;
use thiserror::Error;

/// Name of the verbosity flag the legacy facade is driven by.
pub const VERBOSITY_FLAG: &str = "v";

#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("no 'v' flag found in flag set \"{0}\"")]
    MissingVerbosityFlag(String),

    #[error("invalid value passed in 'v' flag, couldn't convert to a verbosity: \"{0}\"")]
    InvalidVerbosity(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// `base` with its level set to `-verbosity`. Console output leaves the line ending to
/// the legacy bridge, which terminates every record itself.
pub fn verbosity_config(mut base: Config, verbosity: u8) -> Config {
    if base.encoding == Encoding::Console {
        base.encoder.skip_line_ending = true;
    }

    base.level = Level::verbosity(verbosity);
    base
}

/// Derive the legacy configuration from `base` and the `v` flag in `flags`.
pub fn legacy_config(base: Config, flags: &FlagSet) -> Result<Config, LegacyError> {
    let flag = flags
        .lookup(VERBOSITY_FLAG)
        .ok_or_else(|| LegacyError::MissingVerbosityFlag(flags.name().to_string()))?;

    let text = flag.value().render();
    let parsed = text.trim().parse::<i64>();
    let verbosity = match parsed {
        Ok(v) if (0..=MAX_VERBOSITY).contains(&v) => v as u8,
        _ => return Err(LegacyError::InvalidVerbosity(text)),
    };

    Ok(verbosity_config(base, verbosity))
}

/// Build a logger for the legacy facade. `flags` should be the set the `v` flag is bound
/// to; `base` is usually [`FlagConfig::get_config`](crate::FlagConfig::get_config).
pub fn build_for_legacy(base: Config, flags: &FlagSet) -> Result<Logger, LegacyError> {
    Ok(legacy_config(base, flags)?.build()?)
}

/// Install `logger` as the `log` facade's logger, with a matching max level.
pub fn install_log_facade(logger: Logger) -> Result<(), log::SetLoggerError> {
    let max_level = logger.level().to_log_filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Logger::enabled(self, Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = Level::from(record.level());
        if !Logger::enabled(self, level) {
            return;
        }

        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.to_string(),
            _ => String::new(),
        };

        if self.skips_line_ending() {
            self.emit(
                level,
                Some(caller.as_str()),
                &format_args!("{}{}", record.args(), self.line_ending()),
            );
        } else {
            self.emit(level, Some(caller.as_str()), record.args());
        }
    }

    fn flush(&self) {
        let _ = self.sync();
    }
}
