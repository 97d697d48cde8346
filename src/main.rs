// logutil-demo: flag-configured tracing logger plus the legacy `log` facade

use anyhow::{Context, Result};
use logutil::flags::{FlagError, FlagSet, Value};
use logutil::{Config, FlagConfig, legacy};
use std::path::Path;

fn main() -> Result<()> {
    let mut flags = FlagSet::new("logutil-demo");

    let mut log_flags = FlagConfig::new();
    log_flags
        .bind(&mut flags)
        .context("Failed to register logging flags")?;

    let verbosity = Value::int(0);
    flags.var(
        verbosity.clone(),
        legacy::VERBOSITY_FLAG,
        "number for the log level verbosity",
    )?;

    let config_path = Value::string("");
    flags.var(
        config_path.clone(),
        "log-config",
        "Path to a TOML file with the base logger configuration",
    )?;

    if let Err(err) = flags.parse(std::env::args_os()) {
        match err {
            FlagError::Parse(err) => err.exit(),
            err => return Err(err).context("Failed to parse flags"),
        }
    }

    // Flags always win over the file for level and encoding
    let base = match config_path.get().as_str() {
        "" => log_flags.get_config(),
        path => {
            let file_config = Config::load_from_file(Path::new(path))
                .with_context(|| format!("Failed to load logger config: {path}"))?;
            log_flags.apply(file_config)
        }
    };

    let primary = base.build().context("Failed to build primary logger")?;
    primary
        .install()
        .context("Failed to install primary logger")?;

    let legacy_logger = legacy::build_for_legacy(base.clone(), &flags)
        .context("Failed to build logger for the log facade")?
        .named("log");
    legacy::install_log_facade(legacy_logger).context("Failed to install log facade logger")?;

    tracing::info!(
        log_level = %log_flags.level().flag_text(),
        log_encoding = %log_flags.encoding(),
        verbosity = verbosity.get(),
        "logutil demo starting"
    );

    log::info!("message from the log facade");
    log::debug!("debug message from the log facade, shown with -v 1 or more");
    log::trace!("trace message from the log facade, shown with -v 2 or more");

    primary.verbose(3, "verbosity 3 message, shown with --zap-log-level 3 or more");
    primary.warn("warning from the primary logger");

    primary.sync().context("Failed to flush logger")?;

    Ok(())
}
