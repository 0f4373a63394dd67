// src/resource/mock.rs

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use super::{clip_range, ModTime, Resource, Snapshot};
use crate::errors::{Result, SamplewatchError};

#[derive(Debug, Default)]
struct MemoryState {
    bytes: Vec<u8>,
    generation: u64,
    fail_next: Option<io::ErrorKind>,
    snapshot_delay: Duration,
}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicUsize,
    snapshots: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

/// In-memory resource for tests.
///
/// Clones share the same contents, so a test can keep one handle to mutate
/// while the watcher holds another.
#[derive(Debug, Clone, Default)]
pub struct MemoryResource {
    state: Arc<Mutex<MemoryState>>,
    counters: Arc<Counters>,
}

impl MemoryResource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let resource = Self::default();
        resource.state().bytes = bytes.into();
        resource
    }

    /// Deterministic pseudo-random contents, so samples differ from each other.
    pub fn patterned(len: usize) -> Self {
        let bytes = (0..len)
            .map(|i| (i.wrapping_mul(31) ^ (i >> 7)) as u8)
            .collect::<Vec<u8>>();
        Self::new(bytes)
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the contents and bump the modification time.
    pub fn set_contents(&self, bytes: impl Into<Vec<u8>>) {
        let mut state = self.state();
        state.bytes = bytes.into();
        state.generation += 1;
    }

    /// Bump the modification time without touching the bytes.
    pub fn touch(&self) {
        self.state().generation += 1;
    }

    /// Overwrite a single byte without touching the modification time.
    pub fn poke(&self, offset: usize, value: u8) {
        let mut state = self.state();
        if let Some(byte) = state.bytes.get_mut(offset) {
            *byte = value;
        }
    }

    /// Flip every bit of the byte at `offset` without touching the modification time.
    pub fn flip(&self, offset: usize) {
        let mut state = self.state();
        if let Some(byte) = state.bytes.get_mut(offset) {
            *byte = !*byte;
        }
    }

    /// Make the next `snapshot()` call fail with the given error kind.
    pub fn fail_next_snapshot(&self, kind: io::ErrorKind) {
        self.state().fail_next = Some(kind);
    }

    /// Block every `snapshot()` call for `delay` (simulates slow storage).
    pub fn set_snapshot_delay(&self, delay: Duration) {
        self.state().snapshot_delay = delay;
    }

    pub fn len(&self) -> usize {
        self.state().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of byte-range reads performed on any snapshot of this resource.
    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Number of successful `snapshot()` calls.
    pub fn snapshots(&self) -> usize {
        self.counters.snapshots.load(Ordering::SeqCst)
    }

    /// Highest number of snapshots that were alive at the same time.
    pub fn max_live_snapshots(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }
}

impl Resource for MemoryResource {
    type Snapshot = MemorySnapshot;

    fn snapshot(&self) -> Result<MemorySnapshot> {
        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);

        let guard = LiveGuard(Arc::clone(&self.counters));

        let delay = self.state().snapshot_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state();
        if let Some(kind) = state.fail_next.take() {
            return Err(SamplewatchError::from_read(io::Error::new(
                kind,
                "injected snapshot failure",
            )));
        }

        self.counters.snapshots.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySnapshot {
            bytes: state.bytes.clone(),
            modified: ModTime::new(Some(
                SystemTime::UNIX_EPOCH + Duration::from_nanos(state.generation),
            )),
            live: guard,
        })
    }

    fn describe(&self) -> String {
        format!("<memory {} bytes>", self.len())
    }
}

#[derive(Debug)]
struct LiveGuard(Arc<Counters>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Frozen copy of a [`MemoryResource`].
#[derive(Debug)]
pub struct MemorySnapshot {
    bytes: Vec<u8>,
    modified: ModTime,
    live: LiveGuard,
}

impl Snapshot for MemorySnapshot {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn modified(&self) -> ModTime {
        self.modified
    }

    fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        self.live.0.reads.fetch_add(1, Ordering::SeqCst);
        let range = clip_range(offset, length, self.bytes.len() as u64);
        Ok(self.bytes[range].to_vec())
    }
}
