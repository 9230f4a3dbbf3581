//! Slicing of oversized files into fixed-duration outputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::error;
use uuid::Uuid;

use crate::codec::{AudioFormat, WavSink, WavSource};
use crate::{OutputLayout, TriageError};

/// Cut every input into slices of at most `slice_length`, each written as
/// its own output file under the OK directory with the source's format.
/// The final slice of a file may be shorter than the nominal length.
///
/// A decode failure on one input is logged once and, by default, re-raised
/// so the remaining inputs are not touched; with `keep_going` the failure
/// is logged and the next input is processed instead. Slices already on
/// disk are never removed either way.
///
/// Returns the total number of slices written.
pub(crate) fn slice_long_files(
    inputs: &[PathBuf],
    layout: &OutputLayout,
    slice_length: Duration,
    prefix: &str,
    keep_going: bool,
    mut on_file: impl FnMut(&Path),
) -> Result<usize, TriageError> {
    let mut slices_written = 0usize;

    for path in inputs {
        match slice_file(path, layout, slice_length, prefix) {
            Ok(count) => slices_written += count,
            Err(err) => {
                error!("failed to slice '{}': {err}", path.display());
                if !keep_going {
                    return Err(err);
                }
            }
        }
        on_file(path);
    }

    Ok(slices_written)
}

fn slice_file(
    path: &Path,
    layout: &OutputLayout,
    slice_length: Duration,
    prefix: &str,
) -> Result<usize, TriageError> {
    let mut source = WavSource::open(path)?;
    let format = source.format();
    let frames_per_slice = frames_per_slice(&format, slice_length);

    // One id per source file keeps slice names collision-free across the
    // whole run even when two inputs share a stem.
    let file_id = Uuid::new_v4();

    let mut slice_index = 0usize;
    let mut remaining = source.total_frames();

    while remaining > 0 {
        slice_index += 1;
        let take = remaining.min(frames_per_slice);

        let name = format!("{prefix}_{file_id}_{slice_index}.wav");
        let mut sink = WavSink::create(layout.ok_dir().join(name), format)?;
        let copied = source.copy_frames(&mut sink, take)?;
        sink.finalize()?;

        // A short read means the payload ended before the header said it
        // would; stop rather than emit empty slices.
        if copied < take {
            break;
        }
        remaining -= take;
    }

    Ok(slice_index)
}

/// Whole frames per slice: the slice byte size (`slice_length` times the
/// format's average byte rate) rounded down to a frame boundary, but never
/// less than one frame.
fn frames_per_slice(format: &AudioFormat, slice_length: Duration) -> u32 {
    let slice_bytes =
        u128::from(format.avg_bytes_per_second()) * slice_length.as_millis() / 1_000;
    let frames = slice_bytes / u128::from(format.block_align());
    u32::try_from(frames).unwrap_or(u32::MAX).max(1)
}
