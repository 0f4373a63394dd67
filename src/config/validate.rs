// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SamplewatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SamplewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.sampler, raw.watch, raw.store))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_sampler(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn ensure_positive(section: &str, key: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(SamplewatchError::ConfigError(format!(
            "[{section}].{key} must be >= 1 (got 0)"
        )));
    }
    Ok(())
}

fn validate_sampler(cfg: &RawConfigFile) -> Result<()> {
    ensure_positive("sampler", "block_size", cfg.sampler.block_size)?;
    ensure_positive("sampler", "sample_count", cfg.sampler.sample_count as u64)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    let watch = &cfg.watch;
    ensure_positive("watch", "watch_interval_ms", watch.watch_interval_ms)?;
    ensure_positive("watch", "max_delta_ms", watch.max_delta_ms)?;

    // Legal, but the session will time out between two polls.
    if watch.max_delta_ms < watch.watch_interval_ms {
        warn!(
            max_delta_ms = watch.max_delta_ms,
            watch_interval_ms = watch.watch_interval_ms,
            "max_delta_ms is shorter than watch_interval_ms"
        );
    }
    Ok(())
}
