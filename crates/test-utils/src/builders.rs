#![allow(dead_code)]

use std::time::Duration;

use samplewatch::config::{ConfigFile, RawConfigFile};
use samplewatch::sampler::SamplerSettings;
use samplewatch::types::{HandleStorageMode, MissedTickBehaviour};
use samplewatch::watch::WatchSettings;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn block_size(mut self, bytes: u64) -> Self {
        self.config.sampler.block_size = bytes;
        self
    }

    pub fn sample_count(mut self, n: usize) -> Self {
        self.config.sampler.sample_count = n;
        self
    }

    pub fn watch_interval_ms(mut self, ms: u64) -> Self {
        self.config.watch.watch_interval_ms = ms;
        self
    }

    pub fn max_delta_ms(mut self, ms: u64) -> Self {
        self.config.watch.max_delta_ms = ms;
        self
    }

    pub fn storage(mut self, mode: HandleStorageMode) -> Self {
        self.config.store.handle_storage_mode = mode;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatchSettings`.
pub struct WatchSettingsBuilder {
    settings: WatchSettings,
}

impl WatchSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: WatchSettings::default(),
        }
    }

    pub fn block_size(mut self, bytes: u64) -> Self {
        self.settings.sampler.block_size = bytes;
        self
    }

    pub fn sample_count(mut self, n: usize) -> Self {
        self.settings.sampler.sample_count = n;
        self
    }

    pub fn sampler(mut self, sampler: SamplerSettings) -> Self {
        self.settings.sampler = sampler;
        self
    }

    pub fn watch_interval_ms(mut self, ms: u64) -> Self {
        self.settings.watch_interval = Duration::from_millis(ms);
        self
    }

    pub fn max_delta_ms(mut self, ms: u64) -> Self {
        self.settings.max_delta = Duration::from_millis(ms);
        self
    }

    pub fn missed_ticks(mut self, behaviour: MissedTickBehaviour) -> Self {
        self.settings.missed_tick_behaviour = behaviour;
        self
    }

    pub fn build(self) -> WatchSettings {
        self.settings
    }
}

impl Default for WatchSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
