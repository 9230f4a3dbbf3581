//! Batch normalization of a directory of WAV files into a target duration
//! band.
//!
//! A run walks three strictly ordered phases over a read-only source tree:
//!
//! 1. **Classify** — every `.wav` file is copied into `OK`, `NG/short`, or
//!    `NG/long` under the output root, by decoded duration.
//! 2. **Merge** — the short bucket is concatenated into capped output
//!    files, without mixing incompatible formats.
//! 3. **Slice** — each long-bucket file is cut into fixed-duration slices.
//!
//! Merged files and slices land in the `OK` directory next to the files
//! that were acceptable as-is. All I/O is sequential and blocking; each
//! phase completes before the next begins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use thiserror::Error;

mod classify;
mod codec;
mod concat;
mod slice;

pub use classify::{Bucket, BucketCounts, MAX_OK_SECONDS, MIN_OK_SECONDS};
pub use codec::{AudioFormat, SampleEncoding, WavSink, WavSource};

/// Default length of each slice cut from an over-long file.
pub const DEFAULT_SLICE_LENGTH: Duration = Duration::from_secs(5);
/// Default cap on the accumulated duration of a merged output file.
pub const DEFAULT_MERGE_CAP: Duration = Duration::from_secs(15);
/// Default file-name prefix for merged output files.
pub const DEFAULT_MERGE_PREFIX: &str = "merged";
/// Default file-name prefix for slice output files.
pub const DEFAULT_SLICE_PREFIX: &str = "sliced";

/// Errors that can occur while triaging a directory of WAV files.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The source path does not name an existing directory.
    #[error("source directory does not exist: {}", .0.display())]
    MissingSourceDirectory(PathBuf),

    /// An output file with this name already exists; nothing is overwritten.
    #[error("output file already exists: {}", .0.display())]
    DuplicateOutputName(PathBuf),

    /// A source path unexpectedly lacks a final file-name component.
    #[error("failed to derive a file name from '{}'", .0.display())]
    InvalidFileName(PathBuf),

    /// The configured slice length is zero.
    #[error("slice length must be greater than zero")]
    InvalidSliceLength,

    /// The configured merge cap is zero.
    #[error("merge cap must be greater than zero")]
    InvalidMergeCap,

    /// Wrapper around errors produced by the WAV codec.
    #[error(transparent)]
    Wav(#[from] hound::Error),

    /// Wrapper around IO errors encountered while reading, writing, or
    /// copying files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Configuration for a triage run.
#[derive(Clone, Debug)]
pub struct Config {
    source_dir: PathBuf,
    output_root: PathBuf,
    slice_length: Duration,
    merge_cap: Duration,
    merge_prefix: String,
    slice_prefix: String,
    keep_going: bool,
}

impl Config {
    /// Construct a configuration with all knobs at their defaults,
    /// canonicalizing the source path.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output_root: Q,
    ) -> Result<Self, TriageError> {
        Self::builder(source_dir, output_root).build()
    }

    /// Start building a configuration. See [`ConfigBuilder`].
    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output_root: Q,
    ) -> ConfigBuilder {
        ConfigBuilder {
            source_dir: source_dir.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
            slice_length: DEFAULT_SLICE_LENGTH,
            merge_cap: DEFAULT_MERGE_CAP,
            merge_prefix: DEFAULT_MERGE_PREFIX.to_owned(),
            slice_prefix: DEFAULT_SLICE_PREFIX.to_owned(),
            keep_going: false,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    source_dir: PathBuf,
    output_root: PathBuf,
    slice_length: Duration,
    merge_cap: Duration,
    merge_prefix: String,
    slice_prefix: String,
    keep_going: bool,
}

impl ConfigBuilder {
    /// Length of each slice cut from an over-long file.
    pub fn slice_length(mut self, length: Duration) -> Self {
        self.slice_length = length;
        self
    }

    /// Cap on the accumulated duration of a merged output file.
    pub fn merge_cap(mut self, cap: Duration) -> Self {
        self.merge_cap = cap;
        self
    }

    /// File-name prefix for merged output files.
    pub fn merge_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.merge_prefix = prefix.into();
        self
    }

    /// File-name prefix for slice output files.
    pub fn slice_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.slice_prefix = prefix.into();
        self
    }

    /// Keep slicing the remaining long files after a per-file decode
    /// failure instead of stopping at the failing file.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Validate the knobs and canonicalize the source path.
    pub fn build(self) -> Result<Config, TriageError> {
        if self.slice_length.is_zero() {
            return Err(TriageError::InvalidSliceLength);
        }
        if self.merge_cap.is_zero() {
            return Err(TriageError::InvalidMergeCap);
        }

        let source_dir = fs::canonicalize(&self.source_dir)
            .map_err(|_| TriageError::MissingSourceDirectory(self.source_dir.clone()))?;
        if !source_dir.is_dir() {
            return Err(TriageError::MissingSourceDirectory(source_dir));
        }

        Ok(Config {
            source_dir,
            output_root: self.output_root,
            slice_length: self.slice_length,
            merge_cap: self.merge_cap,
            merge_prefix: self.merge_prefix,
            slice_prefix: self.slice_prefix,
            keep_going: self.keep_going,
        })
    }
}

/// The bucket directories derived from the output root.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    ok_dir: PathBuf,
    ng_dir: PathBuf,
    ng_short_dir: PathBuf,
    ng_long_dir: PathBuf,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let ng_dir = root.join("NG");
        Self {
            ok_dir: root.join("OK"),
            ng_short_dir: ng_dir.join("short"),
            ng_long_dir: ng_dir.join("long"),
            ng_dir,
        }
    }

    /// Create any bucket directories that are missing.
    pub fn ensure(&self) -> Result<(), TriageError> {
        for dir in [
            &self.ok_dir,
            &self.ng_dir,
            &self.ng_short_dir,
            &self.ng_long_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn ok_dir(&self) -> &Path {
        &self.ok_dir
    }

    pub fn ng_short_dir(&self) -> &Path {
        &self.ng_short_dir
    }

    pub fn ng_long_dir(&self) -> &Path {
        &self.ng_long_dir
    }

    fn bucket_dir(&self, bucket: Bucket) -> &Path {
        match bucket {
            Bucket::Ok => &self.ok_dir,
            Bucket::NgShort => &self.ng_short_dir,
            Bucket::NgLong => &self.ng_long_dir,
        }
    }
}

/// The three phases of a run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Classify,
    Merge,
    Slice,
}

impl Phase {
    /// Short human-readable label, suitable for progress displays.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Classify => "classifying",
            Phase::Merge => "merging short files",
            Phase::Slice => "slicing long files",
        }
    }
}

/// Progress notifications emitted during [`run_with_progress`].
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// A phase is about to process `total_files` input files.
    PhaseStart { phase: Phase, total_files: usize },
    /// One input file of the current phase has been handled.
    FileDone { phase: Phase, path: &'a Path },
    /// The phase finished and all of its writes are on disk.
    PhaseEnd { phase: Phase },
}

/// What a completed run produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunSummary {
    /// Files copied into each bucket by the classifier.
    pub classified: BucketCounts,
    /// Merged output files written from the short bucket.
    pub segments_written: usize,
    /// Slice output files written from the long bucket.
    pub slices_written: usize,
}

/// Run the full pipeline without progress reporting.
pub fn run(config: Config) -> Result<RunSummary, TriageError> {
    run_with_progress(config, |_| {})
}

/// Run the full pipeline: classify, then merge, then slice.
///
/// The phases form a strict barrier pipeline; the merge and slice phases
/// consume the bucket directories the classifier populated, so phase N+1
/// only starts once phase N has finished writing.
pub fn run_with_progress<F>(config: Config, mut progress: F) -> Result<RunSummary, TriageError>
where
    F: FnMut(ProgressEvent<'_>),
{
    let layout = OutputLayout::new(config.output_root());
    layout.ensure()?;

    let mut summary = RunSummary::default();

    let candidates = classify::wav_entries(config.source_dir())?;
    progress(ProgressEvent::PhaseStart {
        phase: Phase::Classify,
        total_files: candidates.len(),
    });
    summary.classified = classify::classify_files(&candidates, &layout, |path| {
        progress(ProgressEvent::FileDone {
            phase: Phase::Classify,
            path,
        });
    })?;
    progress(ProgressEvent::PhaseEnd {
        phase: Phase::Classify,
    });
    info!(
        "classified {} file(s): {} ok, {} short, {} long",
        summary.classified.total(),
        summary.classified.ok,
        summary.classified.short,
        summary.classified.long
    );

    let shorts = classify::wav_entries(layout.ng_short_dir())?;
    progress(ProgressEvent::PhaseStart {
        phase: Phase::Merge,
        total_files: shorts.len(),
    });
    summary.segments_written = concat::merge_short_files(
        &shorts,
        &layout,
        config.merge_cap.as_secs_f64(),
        &config.merge_prefix,
        |path| {
            progress(ProgressEvent::FileDone {
                phase: Phase::Merge,
                path,
            });
        },
    )?;
    progress(ProgressEvent::PhaseEnd {
        phase: Phase::Merge,
    });

    let longs = classify::wav_entries(layout.ng_long_dir())?;
    progress(ProgressEvent::PhaseStart {
        phase: Phase::Slice,
        total_files: longs.len(),
    });
    summary.slices_written = slice::slice_long_files(
        &longs,
        &layout,
        config.slice_length,
        &config.slice_prefix,
        config.keep_going,
        |path| {
            progress(ProgressEvent::FileDone {
                phase: Phase::Slice,
                path,
            });
        },
    )?;
    progress(ProgressEvent::PhaseEnd {
        phase: Phase::Slice,
    });
    if summary.slices_written > 0 {
        info!(
            "sliced {} file(s) into {} output file(s)",
            longs.len(),
            summary.slices_written
        );
    }

    Ok(summary)
}
