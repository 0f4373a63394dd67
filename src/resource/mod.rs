// src/resource/mod.rs

//! Byte-addressable resources the sampler and the watcher read from.
//!
//! A [`Resource`] is the live handle (e.g. a path on disk). Every poll takes a
//! fresh [`Snapshot`] of it: size and modification time are captured once, and
//! byte ranges are read from that same snapshot so a single tick sees one
//! coherent view of the resource.

use std::fmt::Debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{Result, SamplewatchError};

pub mod mock;

/// Opaque modification timestamp.
///
/// Only compared for equality; no ordering is implied. `None` means the
/// platform could not report a timestamp, in which case every snapshot
/// compares equal and change detection falls back to content sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModTime(Option<SystemTime>);

impl ModTime {
    pub fn new(time: Option<SystemTime>) -> Self {
        Self(time)
    }

    pub fn as_system_time(&self) -> Option<SystemTime> {
        self.0
    }
}

/// A point-in-time view of a resource.
pub trait Snapshot {
    /// Total size in bytes at the time the snapshot was taken.
    fn size(&self) -> u64;

    /// Modification timestamp at the time the snapshot was taken.
    fn modified(&self) -> ModTime;

    /// Read `length` bytes starting at `offset`.
    ///
    /// Ranges reaching past the end are clipped to `size()`; a range starting
    /// at or beyond the end yields an empty buffer.
    fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>>;
}

/// A live, watchable resource.
pub trait Resource: Send + Sync + Debug + 'static {
    type Snapshot: Snapshot + Send + 'static;

    /// Capture the current size / modification time and open it for reading.
    fn snapshot(&self) -> Result<Self::Snapshot>;

    /// Human-readable name used in logs.
    fn describe(&self) -> String;
}

/// A regular file on disk.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    type Snapshot = FileSnapshot;

    fn snapshot(&self) -> Result<FileSnapshot> {
        let file = File::open(&self.path).map_err(SamplewatchError::from_read)?;
        let metadata = file.metadata().map_err(SamplewatchError::from_read)?;
        if !metadata.is_file() {
            return Err(SamplewatchError::ReadFailure(std::io::Error::other(format!(
                "{:?} is not a regular file",
                self.path
            ))));
        }

        Ok(FileSnapshot {
            file,
            size: metadata.len(),
            modified: ModTime::new(metadata.modified().ok()),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An open file handle plus the metadata captured when it was opened.
#[derive(Debug)]
pub struct FileSnapshot {
    file: File,
    size: u64,
    modified: ModTime,
}

impl Snapshot for FileSnapshot {
    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> ModTime {
        self.modified
    }

    fn read(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let end = offset.saturating_add(length).min(self.size);
        if offset >= end {
            return Ok(Vec::new());
        }
        let wanted = end - offset;

        let mut handle = &self.file;
        handle
            .seek(SeekFrom::Start(offset))
            .map_err(SamplewatchError::from_read)?;

        let mut buf = Vec::with_capacity(wanted as usize);
        handle
            .take(wanted)
            .read_to_end(&mut buf)
            .map_err(SamplewatchError::from_read)?;
        Ok(buf)
    }
}

/// Clip `[offset, offset + length)` to a buffer of `len` bytes.
pub(crate) fn clip_range(offset: u64, length: u64, len: u64) -> std::ops::Range<usize> {
    let start = offset.min(len);
    let end = offset.saturating_add(length).min(len);
    start as usize..end as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_range_handles_overrun() {
        assert_eq!(clip_range(0, 4, 10), 0..4);
        assert_eq!(clip_range(8, 4, 10), 8..10);
        assert_eq!(clip_range(12, 4, 10), 10..10);
        assert_eq!(clip_range(u64::MAX, u64::MAX, 10), 10..10);
    }

    #[test]
    fn file_snapshot_reads_clipped_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let resource = FileResource::new(&path);
        let snapshot = resource.snapshot().unwrap();

        assert_eq!(snapshot.size(), 10);
        assert_eq!(snapshot.read(2, 3).unwrap(), b"234");
        assert_eq!(snapshot.read(8, 100).unwrap(), b"89");
        assert!(snapshot.read(10, 5).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let resource = FileResource::new(dir.path().join("nope.bin"));

        let err = resource.snapshot().unwrap_err();
        assert!(matches!(err, SamplewatchError::ReadFailure(_)));
    }
}
