use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use samplewatch::config::{load_and_validate, resolve, Overrides};
use samplewatch::errors::SamplewatchError;
use samplewatch::types::{HandleStorageMode, MissedTickBehaviour};
use samplewatch_test_utils::builders::ConfigFileBuilder;

#[test]
fn full_config_maps_to_watch_settings() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[sampler]
block_size = 16384
sample_count = 256

[watch]
watch_interval_ms = 250
max_delta_ms = 600000
missed_tick_behaviour = "delay"

[store]
handle_storage_mode = "memory"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    let settings = cfg.watch_settings();

    assert_eq!(settings.sampler.block_size, 16384);
    assert_eq!(settings.sampler.sample_count, 256);
    assert_eq!(settings.watch_interval, Duration::from_millis(250));
    assert_eq!(settings.max_delta, Duration::from_secs(600));
    assert_eq!(settings.missed_tick_behaviour, MissedTickBehaviour::Delay);
    assert_eq!(cfg.store().handle_storage_mode, HandleStorageMode::Memory);
}

#[test]
fn missing_sections_use_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[watch]
watch_interval_ms = 100
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    let settings = cfg.watch_settings();
    assert_eq!(settings.watch_interval, Duration::from_millis(100));
    assert_eq!(settings.sampler.block_size, 4096);
    assert_eq!(settings.sampler.sample_count, 64);
    assert_eq!(settings.missed_tick_behaviour, MissedTickBehaviour::Skip);
    assert_eq!(cfg.store().handle_storage_mode, HandleStorageMode::File);
}

#[test]
fn zero_sample_count_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[sampler]
sample_count = 0
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(SamplewatchError::ConfigError(msg)) => {
            assert!(msg.contains("sample_count"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_keys_and_values_are_rejected() {
    let mut unknown_key = NamedTempFile::new().unwrap();
    write!(unknown_key, "[sampler]\nblocksize = 10\n").unwrap();
    assert!(matches!(
        load_and_validate(unknown_key.path()),
        Err(SamplewatchError::TomlError(_))
    ));

    let mut bad_enum = NamedTempFile::new().unwrap();
    write!(bad_enum, "[watch]\nmissed_tick_behaviour = \"queue\"\n").unwrap();
    assert!(matches!(
        load_and_validate(bad_enum.path()),
        Err(SamplewatchError::TomlError(_))
    ));
}

#[test]
fn overrides_win_and_are_validated() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[sampler]\nblock_size = 1024\n").unwrap();

    let cfg = resolve(
        Some(file.path()),
        Overrides {
            block_size: Some(8192),
            max_delta_ms: Some(5000),
            ..Overrides::default()
        },
    )
    .unwrap();
    assert_eq!(cfg.sampler().block_size, 8192);
    assert_eq!(cfg.watch().max_delta_ms, 5000);
    assert_eq!(cfg.watch().missed_tick_behaviour, MissedTickBehaviour::Skip);

    let burst = resolve(
        Some(file.path()),
        Overrides {
            missed_tick_behaviour: Some(MissedTickBehaviour::Burst),
            ..Overrides::default()
        },
    )
    .unwrap();
    assert_eq!(
        burst.watch_settings().missed_tick_behaviour,
        MissedTickBehaviour::Burst
    );

    let bad = resolve(
        Some(file.path()),
        Overrides {
            watch_interval_ms: Some(0),
            ..Overrides::default()
        },
    );
    assert!(matches!(bad, Err(SamplewatchError::ConfigError(_))));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Samplewatch.toml");

    assert!(matches!(
        resolve(Some(&missing), Overrides::default()),
        Err(SamplewatchError::IoError(_))
    ));
}

#[test]
fn builder_produces_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .block_size(2048)
        .sample_count(128)
        .watch_interval_ms(100)
        .max_delta_ms(1000)
        .build();

    let settings = cfg.watch_settings();
    assert_eq!(settings.sampler.block_size, 2048);
    assert_eq!(settings.max_delta, Duration::from_millis(1000));
}
