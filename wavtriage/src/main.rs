mod cli;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use wavtriage_core::{run_with_progress, Config, ProgressEvent, RunSummary};

use crate::cli::build_cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let source_dir = matches
        .get_one::<PathBuf>("source")
        .expect("required argument");
    if !source_dir.is_dir() {
        return Err(anyhow!(
            "source directory does not exist: {}",
            source_dir.display()
        ));
    }

    let output_root = matches
        .get_one::<PathBuf>("output")
        .expect("required argument");
    let slice_length = *matches
        .get_one::<Duration>("slice-length")
        .expect("defaulted argument");
    let merge_cap = *matches
        .get_one::<Duration>("merge-cap")
        .expect("defaulted argument");
    let merge_prefix = matches
        .get_one::<String>("merge-prefix")
        .expect("defaulted argument");
    let slice_prefix = matches
        .get_one::<String>("slice-prefix")
        .expect("defaulted argument");
    let keep_going = matches.get_flag("keep-going");

    let config = Config::builder(source_dir, output_root)
        .slice_length(slice_length)
        .merge_cap(merge_cap)
        .merge_prefix(merge_prefix.as_str())
        .slice_prefix(slice_prefix.as_str())
        .keep_going(keep_going)
        .build()
        .with_context(|| {
            format!(
                "failed to create configuration for '{}'",
                source_dir.display()
            )
        })?;

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let progress_handle = progress.clone();
    let result = run_with_progress(config, move |event| match event {
        ProgressEvent::PhaseStart { phase, total_files } => {
            progress_handle.set_length(total_files as u64);
            progress_handle.set_position(0);
            progress_handle.set_message(phase.label());
        }
        ProgressEvent::FileDone { .. } => progress_handle.inc(1),
        ProgressEvent::PhaseEnd { .. } => {}
    })
    .with_context(|| format!("failed to process '{}'", source_dir.display()));

    progress.finish_and_clear();

    let summary = result?;
    println!("{}", render_summary(&summary));

    Ok(())
}

fn render_summary(summary: &RunSummary) -> String {
    format!(
        "Classified {} file(s) ({} ok, {} short, {} long); wrote {} merged file(s) and {} slice(s).",
        summary.classified.total(),
        summary.classified.ok,
        summary.classified.short,
        summary.classified.long,
        summary.segments_written,
        summary.slices_written,
    )
}
