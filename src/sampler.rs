// src/sampler.rs

//! Sampling-based change detection.
//!
//! Instead of hashing a whole (possibly multi-gigabyte) file on every poll,
//! the [`Sampler`] captures a fixed number of blocks spread evenly across the
//! file and later re-reads exactly those blocks to check for equality.
//!
//! Cost of `init` and `is_same` is `O(min(sample_count, size / block_size) * block_size)`,
//! roughly constant for large files. Changes confined to bytes outside the
//! sampled regions are not detected. Files no larger than one block are
//! captured whole, so comparisons on them are exact.

use std::fmt;

use tracing::debug;

use crate::errors::{Result, SamplewatchError};
use crate::resource::Snapshot;

pub const DEFAULT_BLOCK_SIZE: u64 = 4096;
pub const DEFAULT_SAMPLE_COUNT: usize = 64;

/// Byte range `[offset, offset + length)` within a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub offset: u64,
    pub length: u64,
}

impl Region {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} ({} bytes)", self.offset, self.end(), self.length)
    }
}

/// A region plus the bytes it held when the baseline was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    region: Region,
    bytes: Vec<u8>,
}

impl Sample {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Recorded size and samples the sampler treats as "known good".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    size: u64,
    samples: Vec<Sample>,
}

impl Baseline {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn regions(&self) -> Vec<Region> {
        self.samples.iter().map(Sample::region).collect()
    }

    /// True when the samples cover every byte, i.e. comparisons are exact.
    pub fn is_exact(&self) -> bool {
        let coverage = self.coverage();
        coverage.covered == coverage.size
    }

    /// Number of distinct bytes covered by the samples (overlaps counted once).
    pub fn coverage(&self) -> Coverage {
        let mut regions = self.regions();
        regions.sort_by_key(|r| r.offset);

        let mut covered = 0u64;
        let mut reach = 0u64;
        for region in regions {
            let start = region.offset.max(reach);
            if region.end() > start {
                covered += region.end() - start;
            }
            reach = reach.max(region.end());
        }

        Coverage {
            covered,
            size: self.size,
        }
    }
}

/// How much of a resource a baseline actually looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub covered: u64,
    pub size: u64,
}

impl Coverage {
    /// Covered fraction in `[0, 1]`; an empty resource is fully covered.
    pub fn ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.covered as f64 / self.size as f64
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} bytes ({:.2}%)",
            self.covered,
            self.size,
            self.ratio() * 100.0
        )
    }
}

/// Target block size and block count. Both are upper bounds; the actual
/// layout adapts to the resource size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub block_size: u64,
    pub sample_count: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

/// Compute the sample regions for a resource of `size` bytes.
///
/// - `size == 0`: no regions.
/// - `size <= block_size`: one region covering everything.
/// - otherwise `min(sample_count, ceil(size / block_size))` blocks of
///   `block_size` bytes, centred on evenly spaced midpoints and pulled inward
///   so none crosses either end. Blocks may overlap.
pub fn plan_regions(size: u64, block_size: u64, sample_count: usize) -> Vec<Region> {
    if size == 0 {
        return Vec::new();
    }
    let block_size = block_size.max(1);
    if size <= block_size {
        return vec![Region::new(0, size)];
    }

    let count = (sample_count.max(1) as u64).min(size.div_ceil(block_size));
    let half = block_size / 2;
    let max_offset = size - block_size;

    (0..count)
        .map(|i| {
            // floor(((i + 0.5) / count) * size), in exact integer arithmetic.
            let midpoint = ((2 * i as u128 + 1) * size as u128 / (2 * count as u128)) as u64;
            let offset = midpoint.saturating_sub(half).min(max_offset);
            Region::new(offset, block_size)
        })
        .collect()
}

/// Captures a baseline of a resource and later checks snapshots against it.
#[derive(Debug, Clone)]
pub struct Sampler {
    settings: SamplerSettings,
    baseline: Option<Baseline>,
}

impl Sampler {
    pub fn new(settings: SamplerSettings) -> Self {
        Self {
            settings,
            baseline: None,
        }
    }

    pub fn settings(&self) -> SamplerSettings {
        self.settings
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Capture a fresh baseline from `snapshot`, replacing any previous one.
    ///
    /// The previous baseline is kept if a read fails half-way.
    pub fn init<S: Snapshot + ?Sized>(&mut self, snapshot: &S) -> Result<()> {
        let size = snapshot.size();
        let plan = plan_regions(size, self.settings.block_size, self.settings.sample_count);

        let mut samples = Vec::with_capacity(plan.len());
        for region in plan {
            let bytes = snapshot.read(region.offset, region.length)?;
            samples.push(Sample {
                region: Region::new(region.offset, bytes.len() as u64),
                bytes,
            });
        }

        let baseline = Baseline { size, samples };
        debug!(
            size,
            samples = baseline.samples.len(),
            coverage = %baseline.coverage(),
            "captured baseline"
        );
        self.baseline = Some(baseline);
        Ok(())
    }

    /// Whether `snapshot` matches the baseline on every sampled region.
    ///
    /// A size difference is reported as "different" without reading anything.
    pub fn is_same<S: Snapshot + ?Sized>(&self, snapshot: &S) -> Result<bool> {
        let baseline = self
            .baseline
            .as_ref()
            .ok_or(SamplewatchError::NotInitialized)?;

        if snapshot.size() != baseline.size {
            debug!(
                baseline = baseline.size,
                current = snapshot.size(),
                "size changed"
            );
            return Ok(false);
        }

        for sample in &baseline.samples {
            let current = snapshot.read(sample.region.offset, sample.region.length)?;
            if current != sample.bytes {
                debug!(region = %sample.region, "sample differs");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Regions of the current baseline, without the captured bytes.
    pub fn regions(&self) -> Result<Vec<Region>> {
        self.baseline
            .as_ref()
            .map(Baseline::regions)
            .ok_or(SamplewatchError::NotInitialized)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(SamplerSettings::default())
    }
}
