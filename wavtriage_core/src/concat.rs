//! Merging of undersized files into capped output segments.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::codec::{AudioFormat, WavSink, WavSource};
use crate::{OutputLayout, TriageError};

struct OpenSegment {
    sink: WavSink,
    accumulated_seconds: f64,
}

/// Merge the given files, in order, into as few output files as possible
/// while keeping every output at or under `cap_seconds` of accumulated
/// source duration and never mixing incompatible formats.
///
/// A file whose format does not match the currently open segment is
/// dropped from the run entirely. This mirrors the cap semantics of the
/// original tool: the cap is checked against the running total before a
/// file is appended, so the first file of a segment is always admitted
/// whole and a single over-cap input still forms its own one-file segment.
///
/// Returns the number of output files written. An empty input list writes
/// nothing and is not an error.
pub(crate) fn merge_short_files(
    inputs: &[PathBuf],
    layout: &OutputLayout,
    cap_seconds: f64,
    prefix: &str,
    mut on_file: impl FnMut(&Path),
) -> Result<usize, TriageError> {
    let mut current: Option<OpenSegment> = None;
    let mut segment_index = 0u64;
    let mut segments_written = 0usize;

    for path in inputs {
        let mut source = WavSource::open(path)?;
        let format = source.format();
        let duration = source.duration_seconds();

        let mut segment = match current.take() {
            None => {
                segment_index += 1;
                open_segment(layout, prefix, segment_index, format)?
            }
            Some(segment) => {
                if !format.is_compatible_with(&segment.sink.format()) {
                    warn!(
                        "skipping '{}': format {format:?} does not match the open segment's {:?}",
                        path.display(),
                        segment.sink.format()
                    );
                    current = Some(segment);
                    on_file(path);
                    continue;
                }

                if segment.accumulated_seconds > 0.0
                    && segment.accumulated_seconds + duration > cap_seconds
                {
                    segment.sink.finalize()?;
                    segments_written += 1;
                    segment_index += 1;
                    open_segment(layout, prefix, segment_index, format)?
                } else {
                    segment
                }
            }
        };

        source.copy_all(&mut segment.sink)?;
        segment.accumulated_seconds += duration;
        current = Some(segment);
        on_file(path);
    }

    if let Some(segment) = current {
        segment.sink.finalize()?;
        segments_written += 1;
    }

    if segments_written > 0 {
        info!("merged {} file(s) into {segments_written} output file(s)", inputs.len());
    }

    Ok(segments_written)
}

fn open_segment(
    layout: &OutputLayout,
    prefix: &str,
    index: u64,
    format: AudioFormat,
) -> Result<OpenSegment, TriageError> {
    let path = layout.ok_dir().join(format!("{prefix}_{index}.wav"));
    Ok(OpenSegment {
        sink: WavSink::create(path, format)?,
        accumulated_seconds: 0.0,
    })
}
