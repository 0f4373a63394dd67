// src/watch/mod.rs

//! Polling a resource for changes.
//!
//! The pure state machine lives in [`session`]: it owns one [`Sampler`]
//! and decides, given a snapshot and the current time, whether something
//! changed or the session went idle. The async/IO shell in [`controller`]
//! drives it from two timers (poll and idle), offloads the blocking
//! reads, and emits [`Notification`]s.
//!
//! [`Sampler`]: crate::sampler::Sampler

use std::time::Duration;

use crate::sampler::SamplerSettings;
use crate::types::MissedTickBehaviour;

pub mod controller;
pub mod session;

pub use controller::WatchController;
pub use session::{Change, WatchSession};

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_secs(60);

/// Events emitted to whoever is listening on the notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The modification timestamp changed.
    ChangedMetadata,
    /// A sampled region (or the size) changed; the baseline was re-captured.
    ChangedContent,
    /// Reading the resource failed for one tick. The session keeps going
    /// unless a `Stopped` follows.
    ReadError(String),
    /// The session ended on its own.
    Stopped(StopReason),
}

impl Notification {
    pub fn label(&self) -> &'static str {
        match self {
            Notification::ChangedMetadata => "changed: metadata",
            Notification::ChangedContent => "changed: content",
            Notification::ReadError(_) => "read error",
            Notification::Stopped(_) => "stopped watching",
        }
    }
}

impl From<Change> for Notification {
    fn from(change: Change) -> Self {
        match change {
            Change::Metadata => Notification::ChangedMetadata,
            Change::Content => Notification::ChangedContent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Nothing changed for longer than `max_delta`.
    IdleTimeout,
    /// The resource can no longer be read.
    PermissionDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
}

/// Everything a watch session needs, fixed at start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchSettings {
    pub sampler: SamplerSettings,
    /// Period of the poll timer.
    pub watch_interval: Duration,
    /// Idle timeout: the session stops once nothing changed for longer than this.
    pub max_delta: Duration,
    pub missed_tick_behaviour: MissedTickBehaviour,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            sampler: SamplerSettings::default(),
            watch_interval: DEFAULT_WATCH_INTERVAL,
            max_delta: DEFAULT_MAX_DELTA,
            missed_tick_behaviour: MissedTickBehaviour::default(),
        }
    }
}
