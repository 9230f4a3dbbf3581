//! Thin boundary around the WAV container codec.
//!
//! Everything the pipeline knows about WAV files goes through this module:
//! opening a file for reading yields its [`AudioFormat`] and duration,
//! opening one for writing takes a destination path and a format, and PCM
//! payload moves between the two frame by frame without any resampling or
//! re-encoding.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::TriageError;

/// Sample class and bit depth of a PCM stream.
///
/// Bit depth is part of the encoding so that two equal encodings always
/// share the same byte layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleEncoding {
    /// Signed integer PCM with the given bit depth.
    Int { bits: u16 },
    /// IEEE float PCM with the given bit depth.
    Float { bits: u16 },
}

impl SampleEncoding {
    fn bits(self) -> u16 {
        match self {
            SampleEncoding::Int { bits } | SampleEncoding::Float { bits } => bits,
        }
    }
}

/// The format triple carried by a WAV header.
///
/// Two formats are *compatible* iff all three fields are equal; the
/// concatenator refuses to mix incompatible payloads in one output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    pub encoding: SampleEncoding,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    fn from_spec(spec: WavSpec) -> Self {
        let encoding = match spec.sample_format {
            SampleFormat::Int => SampleEncoding::Int {
                bits: spec.bits_per_sample,
            },
            SampleFormat::Float => SampleEncoding::Float {
                bits: spec.bits_per_sample,
            },
        };

        Self {
            encoding,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        }
    }

    fn to_spec(self) -> WavSpec {
        let (sample_format, bits_per_sample) = match self.encoding {
            SampleEncoding::Int { bits } => (SampleFormat::Int, bits),
            SampleEncoding::Float { bits } => (SampleFormat::Float, bits),
        };

        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample,
            sample_format,
        }
    }

    /// Whether payloads in the two formats may share an output file.
    pub fn is_compatible_with(&self, other: &AudioFormat) -> bool {
        self == other
    }

    /// Storage size of a single sample, rounded up to whole bytes.
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from((self.encoding.bits() + 7) / 8)
    }

    /// Size of one frame (one sample per channel) in bytes.
    pub fn block_align(&self) -> u32 {
        u32::from(self.channels) * self.bytes_per_sample()
    }

    /// PCM payload bytes per second of audio.
    pub fn avg_bytes_per_second(&self) -> u32 {
        self.sample_rate * self.block_align()
    }
}

/// A WAV file opened for reading.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    format: AudioFormat,
}

impl WavSource {
    /// Open `path` and decode its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TriageError> {
        let reader = WavReader::open(path)?;
        let format = AudioFormat::from_spec(reader.spec());
        Ok(Self { reader, format })
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Number of frames in the payload, per the header.
    pub fn total_frames(&self) -> u32 {
        self.reader.duration()
    }

    /// Decoded duration of the payload in seconds.
    pub fn duration_seconds(&self) -> f64 {
        f64::from(self.reader.duration()) / f64::from(self.format.sample_rate)
    }

    /// Copy up to `max_frames` frames from the current read position into
    /// `sink`, returning the number of frames actually copied. Samples are
    /// transferred verbatim; a short count means the payload ended.
    pub fn copy_frames(&mut self, sink: &mut WavSink, max_frames: u32) -> Result<u32, TriageError> {
        let max_samples = u64::from(max_frames) * u64::from(self.format.channels);
        let copied = match self.format.encoding {
            SampleEncoding::Float { .. } => {
                transfer::<f32>(&mut self.reader, &mut sink.writer, max_samples)?
            }
            SampleEncoding::Int { .. } => {
                transfer::<i32>(&mut self.reader, &mut sink.writer, max_samples)?
            }
        };
        Ok((copied / u64::from(self.format.channels)) as u32)
    }

    /// Copy the remaining payload into `sink`.
    pub fn copy_all(&mut self, sink: &mut WavSink) -> Result<(), TriageError> {
        self.copy_frames(sink, u32::MAX)?;
        Ok(())
    }
}

/// A WAV file opened for writing.
///
/// The header is not valid until [`WavSink::finalize`] runs, so every sink
/// must be finalized before the next output of the same sequence opens.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    format: AudioFormat,
}

impl WavSink {
    /// Create `path` with a header describing `format`.
    pub fn create<P: AsRef<Path>>(path: P, format: AudioFormat) -> Result<Self, TriageError> {
        let writer = WavWriter::create(path, format.to_spec())?;
        Ok(Self { writer, format })
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Flush the payload and patch up the header lengths.
    pub fn finalize(self) -> Result<(), TriageError> {
        self.writer.finalize()?;
        Ok(())
    }
}

fn transfer<S: hound::Sample>(
    reader: &mut WavReader<BufReader<File>>,
    writer: &mut WavWriter<BufWriter<File>>,
    max_samples: u64,
) -> Result<u64, TriageError> {
    let mut copied = 0u64;
    for sample in reader.samples::<S>() {
        writer.write_sample(sample?)?;
        copied += 1;
        if copied == max_samples {
            break;
        }
    }
    Ok(copied)
}
