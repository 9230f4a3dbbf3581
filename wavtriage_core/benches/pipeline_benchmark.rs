use std::f32::consts::TAU;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tempfile::TempDir;
use wavtriage_core::{run, Config};

fn write_sine_wave(path: &Path, sample_rate: u32, seconds: u32, frequency: f32) -> io::Result<()> {
    let total_frames = seconds as usize * sample_rate as usize;
    let amplitude = i16::MAX as f32 * 0.6;
    let mut payload = Vec::with_capacity(total_frames * 2);

    for frame in 0..total_frames {
        let t = frame as f32 / sample_rate as f32;
        let sample = (amplitude * (frequency * TAU * t).sin()) as i16;
        payload.extend_from_slice(&sample.to_le_bytes());
    }

    let mut file = File::create(path)?;
    let data_len = payload.len() as u32;
    file.write_all(b"RIFF")?;
    file.write_all(&(36 + data_len).to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?;
    file.write_all(&sample_rate.to_le_bytes())?;
    file.write_all(&(sample_rate * 2).to_le_bytes())?;
    file.write_all(&2u16.to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?;
    file.write_all(b"data")?;
    file.write_all(&data_len.to_le_bytes())?;
    file.write_all(&payload)?;
    Ok(())
}

/// A source tree with short, acceptable, and over-long inputs.
fn synthetic_source(sample_rate: u32) -> io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    write_sine_wave(&dir.path().join("short_a.wav"), sample_rate, 1, 330.0)?;
    write_sine_wave(&dir.path().join("short_b.wav"), sample_rate, 1, 440.0)?;
    write_sine_wave(&dir.path().join("fine.wav"), sample_rate, 5, 550.0)?;
    write_sine_wave(&dir.path().join("long.wav"), sample_rate, 25, 660.0)?;
    Ok(dir)
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for sample_rate in [8_000u32, 44_100] {
        let source = synthetic_source(sample_rate).expect("failed to build source tree");

        group.bench_with_input(
            BenchmarkId::new("run", sample_rate),
            &sample_rate,
            |b, _| {
                b.iter_batched(
                    || {
                        let dest = tempfile::tempdir().expect("failed to create output dir");
                        let config = Config::new(source.path(), dest.path())
                            .expect("failed to build config");
                        (dest, config)
                    },
                    |(dest, config)| {
                        run(config).expect("pipeline run failed");
                        dest
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
