// Library exports for logutil
// Flag-driven configuration of tracing loggers, bridged to the `log` facade.

pub mod config;
pub mod encoding;
pub mod flag_config;
pub mod flags;
pub mod legacy;
pub mod level;
pub mod logger;
pub mod sink;
pub mod sync;

mod fields;
mod filter;
mod format;
mod sampling;

pub use config::{BuildError, Config, EncoderConfig, SamplingConfig, TimeEncoding};
pub use encoding::Encoding;
pub use flag_config::{FlagConfig, LogArgs};
pub use flags::{FlagError, FlagSet, FlagValue, Value};
pub use legacy::{LegacyError, build_for_legacy, install_log_facade};
pub use level::Level;
pub use logger::Logger;
pub use sync::{FlagSync, SyncError, sync_flags};
