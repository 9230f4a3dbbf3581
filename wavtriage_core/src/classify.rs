//! Duration-based classification of the source directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::codec::WavSource;
use crate::{OutputLayout, TriageError};

/// Durations below this classify as too short, in seconds.
pub const MIN_OK_SECONDS: f64 = 2.0;
/// Durations above this classify as too long, in seconds.
pub const MAX_OK_SECONDS: f64 = 20.0;

/// Classification of a source file by its decoded duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    /// Within the acceptable band (boundaries included).
    Ok,
    /// Shorter than [`MIN_OK_SECONDS`]; queued for merging.
    NgShort,
    /// Longer than [`MAX_OK_SECONDS`]; queued for slicing.
    NgLong,
}

impl Bucket {
    /// Bucket for a decoded duration. The band boundaries belong to
    /// [`Bucket::Ok`].
    pub fn for_duration(seconds: f64) -> Self {
        if seconds < MIN_OK_SECONDS {
            Bucket::NgShort
        } else if seconds > MAX_OK_SECONDS {
            Bucket::NgLong
        } else {
            Bucket::Ok
        }
    }
}

/// Number of files classified into each bucket during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub ok: usize,
    pub short: usize,
    pub long: usize,
}

impl BucketCounts {
    fn record(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Ok => self.ok += 1,
            Bucket::NgShort => self.short += 1,
            Bucket::NgLong => self.long += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.short + self.long
    }
}

/// List the `.wav` files directly inside `dir`, sorted by path so that
/// every phase sees a deterministic order. Other entries are ignored.
pub(crate) fn wav_entries(dir: &Path) -> Result<Vec<PathBuf>, TriageError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("wav") {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

/// Copy each candidate into the bucket directory matching its decoded
/// duration, preserving the file name. The sources are never modified. A
/// decode failure aborts the run; files copied before it stay in place.
pub(crate) fn classify_files(
    candidates: &[PathBuf],
    layout: &OutputLayout,
    mut on_file: impl FnMut(&Path),
) -> Result<BucketCounts, TriageError> {
    let mut counts = BucketCounts::default();

    for path in candidates {
        let duration = WavSource::open(path)?.duration_seconds();
        let bucket = Bucket::for_duration(duration);

        let file_name = path
            .file_name()
            .ok_or_else(|| TriageError::InvalidFileName(path.clone()))?;
        let destination = layout.bucket_dir(bucket).join(file_name);
        if destination.exists() {
            return Err(TriageError::DuplicateOutputName(destination));
        }

        fs::copy(path, &destination)?;
        debug!(
            "classified '{}' ({duration:.3}s) into {bucket:?}",
            path.display()
        );
        counts.record(bucket);
        on_file(path);
    }

    Ok(counts)
}
