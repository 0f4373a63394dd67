// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::sampler::{SamplerSettings, DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_COUNT};
use crate::types::{HandleStorageMode, MissedTickBehaviour};
use crate::watch::WatchSettings;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [sampler]
/// block_size = 4096
/// sample_count = 64
///
/// [watch]
/// watch_interval_ms = 1000
/// max_delta_ms = 60000
/// missed_tick_behaviour = "skip"
///
/// [store]
/// handle_storage_mode = "file"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw,
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub sampler: SamplerSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub store: StoreSection,
}

/// `[sampler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerSection {
    /// Target bytes per sampled block.
    #[serde(default = "default_block_size")]
    pub block_size: u64,

    /// Target number of sampled blocks.
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

fn default_block_size() -> u64 {
    DEFAULT_BLOCK_SIZE
}

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            sample_count: default_sample_count(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,

    /// Stop watching after this long without a detected change.
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,

    /// `"skip"`, `"delay"` or `"burst"`.
    #[serde(default)]
    pub missed_tick_behaviour: MissedTickBehaviour,
}

fn default_watch_interval_ms() -> u64 {
    1000
}

fn default_max_delta_ms() -> u64 {
    60_000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            watch_interval_ms: default_watch_interval_ms(),
            max_delta_ms: default_max_delta_ms(),
            missed_tick_behaviour: MissedTickBehaviour::default(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// `"file"` (default) or `"memory"`.
    #[serde(default)]
    pub handle_storage_mode: HandleStorageMode,
}

/// Values coming from the command line that win over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub block_size: Option<u64>,
    pub sample_count: Option<usize>,
    pub watch_interval_ms: Option<u64>,
    pub max_delta_ms: Option<u64>,
    pub missed_tick_behaviour: Option<MissedTickBehaviour>,
}

impl RawConfigFile {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(v) = overrides.block_size {
            self.sampler.block_size = v;
        }
        if let Some(v) = overrides.sample_count {
            self.sampler.sample_count = v;
        }
        if let Some(v) = overrides.watch_interval_ms {
            self.watch.watch_interval_ms = v;
        }
        if let Some(v) = overrides.max_delta_ms {
            self.watch.max_delta_ms = v;
        }
        if let Some(v) = overrides.missed_tick_behaviour {
            self.watch.missed_tick_behaviour = v;
        }
        self
    }
}

/// Validated configuration. Build one with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    sampler: SamplerSection,
    watch: WatchSection,
    store: StoreSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(sampler: SamplerSection, watch: WatchSection, store: StoreSection) -> Self {
        Self {
            sampler,
            watch,
            store,
        }
    }

    pub fn sampler(&self) -> &SamplerSection {
        &self.sampler
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn store(&self) -> &StoreSection {
        &self.store
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            block_size: self.sampler.block_size,
            sample_count: self.sampler.sample_count,
        }
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            sampler: self.sampler_settings(),
            watch_interval: Duration::from_millis(self.watch.watch_interval_ms),
            max_delta: Duration::from_millis(self.watch.max_delta_ms),
            missed_tick_behaviour: self.watch.missed_tick_behaviour,
        }
    }
}
