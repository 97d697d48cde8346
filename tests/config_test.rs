// Unit tests for configuration
// Presets, validation, and TOML loading

use chrono::{FixedOffset, TimeZone, Utc};
use logutil::config::{BuildError, Config, EncoderConfig, SamplingConfig, TimeEncoding};
use logutil::level::LevelEncoder;
use logutil::{Encoding, Level};
use std::io::Write;

#[test]
fn test_production_preset() {
    let config = Config::production();

    assert_eq!(config.level, Level::INFO);
    assert_eq!(config.encoding, Encoding::Json);
    assert_eq!(config.output_paths, vec!["stderr".to_string()]);
    assert_eq!(config.sampling, Some(SamplingConfig::default()));
    assert_eq!(config.encoder.message_key, "msg");
    assert_eq!(config.encoder.time_encoding, TimeEncoding::Epoch);
    assert!(config.validate().is_ok());
}

#[test]
fn test_development_preset() {
    let config = Config::development();

    assert_eq!(config.level, Level::DEBUG);
    assert_eq!(config.encoding, Encoding::Console);
    assert!(config.sampling.is_none());
    assert_eq!(config.encoder.level_key, "L");
    assert_eq!(config.encoder.time_encoding, TimeEncoding::Iso8601);
    assert!(matches!(config.encoder.level_encoder, LevelEncoder::Capital));
}

#[test]
fn test_sampling_defaults() {
    let sampling = SamplingConfig::default();

    assert_eq!(sampling.initial, 100);
    assert_eq!(sampling.thereafter, 100);
    assert_eq!(sampling.tick_ms, 1000);
}

#[test]
fn test_validation_no_output_paths() {
    let mut config = Config::production();
    config.output_paths.clear();

    let result = config.validate();
    assert!(matches!(result, Err(BuildError::NoOutputPaths)));
    assert!(config.build().is_err());
}

#[test]
fn test_validation_zero_sampling_tick() {
    let mut config = Config::production();
    config.sampling = Some(SamplingConfig {
        initial: 1,
        thereafter: 1,
        tick_ms: 0,
    });

    let result = config.validate();
    assert!(matches!(result, Err(BuildError::InvalidSamplingTick)));
}

#[test]
fn test_open_sink_in_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("app.log");

    let mut config = Config::production();
    config.output_paths = vec![path.to_string_lossy().into_owned()];

    match config.build() {
        Err(BuildError::OpenSink { path: failed, .. }) => {
            assert!(failed.ends_with("app.log"));
        }
        other => panic!("Expected OpenSink error, got {:?}", other),
    }
}

#[test]
fn test_from_toml_str() {
    let toml = r#"
level = "3"
encoding = "console"
output_paths = ["stdout"]

[sampling]
initial = 10
thereafter = 5

[encoder]
message_key = "message"
time_encoding = "rfc3339"
"#;

    let config = Config::from_toml_str(toml).unwrap();
    assert_eq!(config.level, Level::new(-3));
    assert_eq!(config.encoding, Encoding::Console);
    assert_eq!(config.output_paths, vec!["stdout".to_string()]);

    let sampling = config.sampling.unwrap();
    assert_eq!(sampling.initial, 10);
    assert_eq!(sampling.thereafter, 5);
    assert_eq!(sampling.tick_ms, 1000, "unset fields keep their defaults");

    assert_eq!(config.encoder.message_key, "message");
    assert_eq!(config.encoder.level_key, "level");
    assert_eq!(config.encoder.time_encoding, TimeEncoding::Rfc3339);
}

#[test]
fn test_from_toml_str_empty_is_production() {
    let config = Config::from_toml_str("").unwrap();
    let production = Config::production();

    assert_eq!(config.level, production.level);
    assert_eq!(config.encoding, production.encoding);
    assert_eq!(config.output_paths, production.output_paths);
    assert_eq!(config.sampling, production.sampling);
}

#[test]
fn test_from_toml_str_rejects_bad_level() {
    let result = Config::from_toml_str("level = \"loud\"");

    match result {
        Err(BuildError::ParseConfig(err)) => {
            assert!(err.to_string().contains("invalid log level \"loud\""));
        }
        other => panic!("Expected ParseConfig error, got {:?}", other),
    }
}

#[test]
fn test_from_toml_str_rejects_bad_encoding() {
    let result = Config::from_toml_str("encoding = \"pretty\"");
    assert!(matches!(result, Err(BuildError::ParseConfig(_))));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "level = \"warn\"").unwrap();
    writeln!(file, "encoding = \"json\"").unwrap();

    let config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.level, Level::WARN);
    assert_eq!(config.encoding, Encoding::Json);
}

#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let result = Config::load_from_file(&path);
    match result {
        Err(BuildError::ReadConfig { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("Expected ReadConfig error, got {:?}", other),
    }
}

#[test]
fn test_production_config_survives_toml() {
    let mut config = Config::production();
    config.level = Level::verbosity(4);
    config.encoder.skip_line_ending = true;

    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("level = \"4\""), "text: {}", text);

    let loaded = Config::from_toml_str(&text).unwrap();
    assert_eq!(loaded.level, Level::new(-4));
    assert_eq!(loaded.sampling, config.sampling);
    assert!(loaded.encoder.skip_line_ending);
}

#[test]
fn test_custom_level_encoder_not_serialized() {
    let mut encoder = EncoderConfig::production();
    encoder.level_encoder = LevelEncoder::Custom(logutil::level::verbosity_level_name);

    let text = toml::to_string(&encoder).unwrap();
    assert!(!text.contains("level_encoder"));
}

#[test]
fn test_time_encoding_values() {
    let now = chrono::Local::now();

    assert!(TimeEncoding::Epoch.encode(now).is_f64());

    let iso = TimeEncoding::Iso8601.encode(now);
    assert!(iso.as_str().unwrap().starts_with(&now.format("%Y-%m-%dT").to_string()));

    let rfc = TimeEncoding::Rfc3339.encode(now);
    assert!(chrono::DateTime::parse_from_rfc3339(rfc.as_str().unwrap()).is_ok());
}

#[test]
fn test_iso8601_offsets() {
    let utc = Utc.with_ymd_and_hms(2022, 3, 4, 15, 4, 5).unwrap();
    assert_eq!(
        TimeEncoding::Iso8601.encode(utc),
        "2022-03-04T15:04:05.000Z"
    );

    let eastern = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2022, 3, 4, 15, 4, 5)
        .unwrap();
    assert_eq!(
        TimeEncoding::Iso8601.encode(eastern),
        "2022-03-04T15:04:05.000-0500"
    );

    let zero_fixed = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2022, 3, 4, 15, 4, 5)
        .unwrap();
    assert_eq!(
        TimeEncoding::Iso8601.encode(zero_fixed),
        "2022-03-04T15:04:05.000Z"
    );
}
