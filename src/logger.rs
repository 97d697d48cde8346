// Structured logger built from a Config
// A Logger owns its own tracing dispatcher: a registry with the level gate and the
// configured event formatter writing to the configured sinks.

use crate::config::Config;
use crate::filter::LevelGate;
use crate::format::EventFormat;
use crate::level::Level;
use crate::sampling::Sampler;
use crate::sink::Sinks;
use std::fmt;
use std::io;
use std::panic::Location;
use tracing::dispatcher::{self, Dispatch, SetGlobalDefaultError};
use tracing_subscriber::layer::SubscriberExt;

macro_rules! emit_event {
    ($level:expr, $exact:expr, $name:expr, $caller:expr, $message:expr) => {
        tracing::event!(
            target: "logutil",
            $level,
            logutil.level = $exact,
            logger = $name,
            caller = $caller,
            "{}",
            $message
        )
    };
}

#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    level: Level,
    name: String,
    line_ending: String,
    skip_line_ending: bool,
    sinks: Sinks,
}

impl Logger {
    pub(crate) fn new(config: &Config, sinks: Sinks) -> Self {
        let gate = LevelGate::new(config.level, config.sampling.as_ref().map(Sampler::new));
        let format = tracing_subscriber::fmt::layer()
            .event_format(EventFormat::new(config.encoding, config.encoder.clone()))
            .with_writer(sinks.clone());

        let subscriber = tracing_subscriber::registry().with(gate).with(format);

        Logger {
            dispatch: Dispatch::new(subscriber),
            level: config.level,
            name: String::new(),
            line_ending: config.encoder.line_ending.clone(),
            skip_line_ending: config.encoder.skip_line_ending,
            sinks,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// A logger sharing this one's outputs, named `<current>.<name>`.
    pub fn named(&self, name: &str) -> Logger {
        let mut logger = self.clone();
        logger.name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        };
        logger
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }

        let location = Location::caller();
        let caller = format!("{}:{}", location.file(), location.line());
        self.emit(level, Some(caller.as_str()), &message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::DEBUG, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::INFO, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::WARN, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::ERROR, message);
    }

    /// Log at custom verbosity tier `verbosity` (level `-verbosity`).
    #[track_caller]
    pub fn verbose(&self, verbosity: u8, message: impl fmt::Display) {
        self.log(Level::verbosity(verbosity), message);
    }

    /// Run `f` with this logger as the current `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process-wide `tracing` dispatcher.
    pub fn install(&self) -> Result<(), SetGlobalDefaultError> {
        dispatcher::set_global_default(self.dispatch.clone())
    }

    /// Flush every output.
    pub fn sync(&self) -> io::Result<()> {
        self.sinks.flush()
    }

    pub(crate) fn line_ending(&self) -> &str {
        &self.line_ending
    }

    pub(crate) fn skips_line_ending(&self) -> bool {
        self.skip_line_ending
    }

    pub(crate) fn emit(&self, level: Level, caller: Option<&str>, message: &dyn fmt::Display) {
        let exact = i64::from(level.get());
        let name = self.name.as_str();

        dispatcher::with_default(&self.dispatch, || match level.get() {
            2..=i8::MAX => emit_event!(tracing::Level::ERROR, exact, name, caller, message),
            1 => emit_event!(tracing::Level::WARN, exact, name, caller, message),
            0 => emit_event!(tracing::Level::INFO, exact, name, caller, message),
            -1 => emit_event!(tracing::Level::DEBUG, exact, name, caller, message),
            _ => emit_event!(tracing::Level::TRACE, exact, name, caller, message),
        });
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("name", &self.name)
            .field("skip_line_ending", &self.skip_line_ending)
            .finish_non_exhaustive()
    }
}
