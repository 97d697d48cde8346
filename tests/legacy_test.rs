// Integration tests for the legacy `log` facade logger
// Verbosity derivation from the `v` flag and record output through log::Log

use log::Log;
use logutil::legacy::{self, LegacyError, VERBOSITY_FLAG};
use logutil::{Config, Encoding, FlagSet, Level, Value};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn flags_with_verbosity(v: i64) -> FlagSet {
    let mut flags = FlagSet::new("klog");
    flags
        .var(Value::int(v), VERBOSITY_FLAG, "number for the log level verbosity")
        .unwrap();
    flags
}

fn console_base() -> Config {
    let mut config = Config::production();
    config.encoding = Encoding::Console;
    config.sampling = None;
    config
}

#[test]
fn test_legacy_config_console() {
    let flags = flags_with_verbosity(2);

    let config = legacy::legacy_config(console_base(), &flags).unwrap();
    assert_eq!(config.level, Level::new(-2));
    assert!(config.encoder.skip_line_ending);
}

#[test]
fn test_legacy_config_json_keeps_line_ending() {
    let flags = flags_with_verbosity(2);
    let mut base = console_base();
    base.encoding = Encoding::Json;

    let config = legacy::legacy_config(base, &flags).unwrap();
    assert_eq!(config.level, Level::new(-2));
    assert!(!config.encoder.skip_line_ending);
}

#[test]
fn test_legacy_config_follows_parsed_flag() {
    let mut flags = flags_with_verbosity(0);
    flags.parse(["klog", "-v", "5"]).unwrap();

    let config = legacy::legacy_config(console_base(), &flags).unwrap();
    assert_eq!(config.level, Level::verbosity(5));
}

#[test]
fn test_legacy_config_zero_is_info() {
    let flags = flags_with_verbosity(0);

    let config = legacy::legacy_config(console_base(), &flags).unwrap();
    assert_eq!(config.level, Level::INFO);
}

#[test]
fn test_legacy_config_missing_flag() {
    let flags = FlagSet::new("empty-set");

    let result = legacy::legacy_config(console_base(), &flags);
    match result {
        Err(LegacyError::MissingVerbosityFlag(name)) => assert_eq!(name, "empty-set"),
        other => panic!("Expected MissingVerbosityFlag error, got {:?}", other),
    }
}

#[test]
fn test_legacy_config_non_numeric_flag() {
    let mut flags = FlagSet::new("klog");
    flags.var(Value::string("abc"), VERBOSITY_FLAG, "").unwrap();

    let result = legacy::legacy_config(console_base(), &flags);
    assert!(matches!(result, Err(LegacyError::InvalidVerbosity(text)) if text == "abc"));
}

#[test]
fn test_legacy_config_out_of_range() {
    for v in [-1, 129] {
        let flags = flags_with_verbosity(v);

        let result = legacy::legacy_config(console_base(), &flags);
        assert!(
            matches!(result, Err(LegacyError::InvalidVerbosity(_))),
            "v={} should be rejected",
            v
        );
    }
}

#[test]
fn test_build_for_legacy() {
    let flags = flags_with_verbosity(3);

    let logger = legacy::build_for_legacy(console_base(), &flags).unwrap();
    assert_eq!(logger.level(), Level::new(-3));
}

#[test]
fn test_build_for_legacy_propagates_build_error() {
    let flags = flags_with_verbosity(1);
    let mut base = console_base();
    base.output_paths.clear();

    let result = legacy::build_for_legacy(base, &flags);
    assert!(matches!(result, Err(LegacyError::Build(_))));
}

#[test]
fn test_console_records_end_with_one_line_ending() {
    let buffer = SharedBuffer::default();
    let config = legacy::verbosity_config(console_base(), 2);
    let logger = config.build_with_writer(buffer.clone()).unwrap();

    Log::log(
        &logger,
        &log::Record::builder()
            .level(log::Level::Info)
            .file(Some("src/client.rs"))
            .line(Some(42))
            .args(format_args!("request sent"))
            .build(),
    );
    Log::log(
        &logger,
        &log::Record::builder()
            .level(log::Level::Trace)
            .args(format_args!("trace detail"))
            .build(),
    );

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.split_terminator('\n').collect();
    assert_eq!(lines.len(), 2, "contents: {:?}", contents);
    assert_eq!(contents.matches('\n').count(), 2);

    let first: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(first[1], "info");
    assert_eq!(first[2], "src/client.rs:42");
    assert_eq!(first[3], "request sent");

    let second: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(second[1], "Level(-2)");
    assert_eq!(second.len(), 3, "no caller element without a file: {:?}", second);
}

#[test]
fn test_records_below_verbosity_are_dropped() {
    let buffer = SharedBuffer::default();
    let config = legacy::verbosity_config(console_base(), 1);
    let logger = config.build_with_writer(buffer.clone()).unwrap();

    let metadata = log::Metadata::builder().level(log::Level::Trace).build();
    assert!(!Log::enabled(&logger, &metadata));

    Log::log(
        &logger,
        &log::Record::builder()
            .level(log::Level::Trace)
            .args(format_args!("too verbose"))
            .build(),
    );
    Log::log(
        &logger,
        &log::Record::builder()
            .level(log::Level::Debug)
            .args(format_args!("debug detail"))
            .build(),
    );

    let contents = buffer.contents();
    assert!(!contents.contains("too verbose"));
    assert!(contents.contains("debug detail"));
}

#[test]
fn test_json_records_named_logger() {
    let buffer = SharedBuffer::default();
    let mut base = console_base();
    base.encoding = Encoding::Json;
    let logger = legacy::verbosity_config(base, 0)
        .build_with_writer(buffer.clone())
        .unwrap()
        .named("klog");

    Log::log(
        &logger,
        &log::Record::builder()
            .level(log::Level::Warn)
            .file(Some("src/watch.rs"))
            .line(Some(7))
            .args(format_args!("watch restarted"))
            .build(),
    );

    let contents = buffer.contents();
    assert_eq!(contents.matches('\n').count(), 1);

    let entry: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
    assert_eq!(entry["level"], "warn");
    assert_eq!(entry["logger"], "klog");
    assert_eq!(entry["caller"], "src/watch.rs:7");
    assert_eq!(entry["msg"], "watch restarted");
}

#[test]
fn test_install_log_facade() {
    let buffer = SharedBuffer::default();
    let logger = legacy::verbosity_config(console_base(), 1)
        .build_with_writer(buffer.clone())
        .unwrap();

    legacy::install_log_facade(logger).unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Debug);

    log::debug!("through the facade");
    log::trace!("filtered out");
    log::logger().flush();

    let contents = buffer.contents();
    assert!(contents.contains("through the facade"));
    assert!(contents.contains("legacy_test.rs"));
    assert!(!contents.contains("filtered out"));
}
