// src/watch/session.rs

//! Pure watch-session state machine.
//!
//! No timers, channels or spawned tasks live here: the caller passes in a
//! snapshot and the current instant, and gets back what happened. That keeps
//! the semantics testable with a hand-driven clock.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::Result;
use crate::resource::{ModTime, Snapshot};
use crate::sampler::{Region, Sampler, SamplerSettings};

/// Timer resolution; one step past `max_delta` is the first idle instant.
const IDLE_STEP: Duration = Duration::from_millis(1);
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What a poll detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Modification timestamp differs from the tracked one.
    Metadata,
    /// Sampled content differs from the baseline.
    Content,
}

/// State of one active watch.
#[derive(Debug)]
pub struct WatchSession {
    sampler: Sampler,
    modified: ModTime,
    last_update: Instant,
    max_delta: Duration,
}

impl WatchSession {
    /// Capture the initial timestamp and baseline from `snapshot`.
    pub fn start<S: Snapshot + ?Sized>(
        sampler: SamplerSettings,
        max_delta: Duration,
        snapshot: &S,
        now: Instant,
    ) -> Result<Self> {
        let mut sampler = Sampler::new(sampler);
        let modified = snapshot.modified();
        sampler.init(snapshot)?;

        info!(size = snapshot.size(), "watch session started");

        Ok(Self {
            sampler,
            modified,
            last_update: now,
            max_delta,
        })
    }

    /// Check `snapshot` for changes.
    ///
    /// The timestamp is checked first. A timestamp change is reported as
    /// [`Change::Metadata`] and the baseline is deliberately left alone, so
    /// later polls keep comparing against the old samples. Only when the
    /// timestamp is unchanged are the samples compared; a mismatch re-captures
    /// the baseline from `snapshot`.
    pub fn poll<S: Snapshot + ?Sized>(&mut self, snapshot: &S, now: Instant) -> Result<Option<Change>> {
        let modified = snapshot.modified();
        if modified != self.modified {
            debug!(?modified, previous = ?self.modified, "modification time changed");
            self.modified = modified;
            self.last_update = now;
            return Ok(Some(Change::Metadata));
        }

        if self.sampler.is_same(snapshot)? {
            return Ok(None);
        }

        debug!(size = snapshot.size(), "content changed; re-baselining");
        self.sampler.init(snapshot)?;
        self.last_update = now;
        Ok(Some(Change::Content))
    }

    /// Whether nothing changed for strictly longer than `max_delta`.
    pub fn is_idle(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_update) > self.max_delta
    }

    /// Earliest instant at which [`is_idle`](Self::is_idle) holds, given no
    /// further changes.
    pub fn idle_deadline(&self) -> Instant {
        let after = self.max_delta.saturating_add(IDLE_STEP);
        self.last_update
            .checked_add(after)
            .unwrap_or_else(|| self.last_update + FAR_FUTURE)
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn regions(&self) -> Result<Vec<Region>> {
        self.sampler.regions()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mock::MemoryResource;
    use crate::resource::Resource;

    const SMALL: SamplerSettings = SamplerSettings {
        block_size: 4096,
        sample_count: 64,
    };

    fn start(res: &MemoryResource, now: Instant) -> WatchSession {
        WatchSession::start(SMALL, Duration::from_millis(1000), &res.snapshot().unwrap(), now).unwrap()
    }

    #[test]
    fn unchanged_resource_reports_nothing() {
        let res = MemoryResource::patterned(2000);
        let t0 = Instant::now();
        let mut session = start(&res, t0);

        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(session.poll(&res.snapshot().unwrap(), t1).unwrap(), None);
        assert_eq!(session.last_update(), t0);
    }

    #[test]
    fn metadata_change_short_circuits_content_check() {
        let res = MemoryResource::patterned(2000);
        let t0 = Instant::now();
        let mut session = start(&res, t0);
        let baseline = session.sampler().baseline().cloned();

        res.touch();
        res.flip(10);
        let reads_before = res.reads();
        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(
            session.poll(&res.snapshot().unwrap(), t1).unwrap(),
            Some(Change::Metadata)
        );
        assert_eq!(res.reads(), reads_before);
        assert_eq!(session.last_update(), t1);
        assert_eq!(session.sampler().baseline().cloned(), baseline);

        // The stale baseline still catches the byte change on the next poll.
        let t2 = t1 + Duration::from_millis(100);
        assert_eq!(
            session.poll(&res.snapshot().unwrap(), t2).unwrap(),
            Some(Change::Content)
        );
        assert_eq!(session.last_update(), t2);
    }

    #[test]
    fn content_change_rebaselines() {
        let res = MemoryResource::patterned(2000);
        let t0 = Instant::now();
        let mut session = start(&res, t0);

        res.flip(1999);
        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(
            session.poll(&res.snapshot().unwrap(), t1).unwrap(),
            Some(Change::Content)
        );

        let t2 = t1 + Duration::from_millis(100);
        assert_eq!(session.poll(&res.snapshot().unwrap(), t2).unwrap(), None);
    }

    #[test]
    fn idle_only_after_strictly_exceeding_max_delta() {
        let res = MemoryResource::patterned(10);
        let t0 = Instant::now();
        let session = start(&res, t0);

        assert!(!session.is_idle(t0 + Duration::from_millis(999)));
        assert!(!session.is_idle(t0 + Duration::from_millis(1000)));
        assert!(session.is_idle(t0 + Duration::from_millis(1001)));
    }

    #[test]
    fn idle_deadline_is_first_idle_instant() {
        let res = MemoryResource::patterned(10);
        let t0 = Instant::now();
        let mut session = start(&res, t0);

        let deadline = session.idle_deadline();
        assert_eq!(deadline, t0 + Duration::from_millis(1001));
        assert!(session.is_idle(deadline));
        assert!(!session.is_idle(deadline - Duration::from_millis(1)));

        res.touch();
        let t1 = t0 + Duration::from_millis(400);
        session.poll(&res.snapshot().unwrap(), t1).unwrap();
        assert_eq!(session.idle_deadline(), t1 + Duration::from_millis(1001));
    }

    #[test]
    fn huge_max_delta_does_not_overflow() {
        let res = MemoryResource::patterned(10);
        let t0 = Instant::now();
        let session =
            WatchSession::start(SMALL, Duration::MAX, &res.snapshot().unwrap(), t0).unwrap();

        assert!(session.idle_deadline() > t0);
        assert!(!session.is_idle(t0 + Duration::from_secs(3600)));
    }
}
