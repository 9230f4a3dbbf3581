use std::path::PathBuf;
use std::time::Duration;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};
use wavtriage_core::{DEFAULT_MERGE_PREFIX, DEFAULT_SLICE_PREFIX};

/// Parse a human-friendly duration string into a [`Duration`].
///
/// Supported suffixes are `ms` (milliseconds), `s` (seconds), `m`
/// (minutes), and `h` (hours); components may be chained, as in `"1m30s"`.
/// The total must be greater than zero and representable in whole
/// milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let input = value.trim();
    if input.is_empty() {
        return Err("duration cannot be empty".into());
    }

    let mut total_ms: u64 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration '{value}'"))?;
        if digits_end == 0 {
            return Err(format!("invalid duration '{value}'"));
        }

        let number: u64 = rest[..digits_end]
            .parse()
            .map_err(|_| format!("invalid duration '{value}'"))?;
        rest = &rest[digits_end..];

        let (factor, unit_len) = if rest.starts_with("ms") {
            (1u64, 2)
        } else if rest.starts_with('s') {
            (1_000, 1)
        } else if rest.starts_with('m') {
            (60_000, 1)
        } else if rest.starts_with('h') {
            (3_600_000, 1)
        } else {
            return Err(format!("unknown unit in duration '{value}'"));
        };
        rest = &rest[unit_len..];

        total_ms = number
            .checked_mul(factor)
            .and_then(|ms| total_ms.checked_add(ms))
            .ok_or_else(|| "duration is too large".to_owned())?;
    }

    if total_ms == 0 {
        return Err("duration must be greater than zero".into());
    }

    Ok(Duration::from_millis(total_ms))
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Normalize a directory of WAV files into a duration band")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("source")
                .value_name("SOURCE_DIR")
                .help("Directory containing the input .wav files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DEST_DIR")
                .help("Directory that receives the OK/NG output tree")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("slice-length")
                .short('l')
                .long("slice-length")
                .value_name("DURATION")
                .help("Length of each slice cut from over-long files (e.g. 500ms, 5s)")
                .default_value("5s")
                .value_parser(ValueParser::new(parse_duration)),
        )
        .arg(
            Arg::new("merge-cap")
                .long("merge-cap")
                .value_name("DURATION")
                .help("Maximum accumulated duration of a merged output file")
                .default_value("15s")
                .value_parser(ValueParser::new(parse_duration)),
        )
        .arg(
            Arg::new("merge-prefix")
                .long("merge-prefix")
                .value_name("PREFIX")
                .help("File-name prefix for merged output files")
                .default_value(DEFAULT_MERGE_PREFIX),
        )
        .arg(
            Arg::new("slice-prefix")
                .long("slice-prefix")
                .value_name("PREFIX")
                .help("File-name prefix for slice output files")
                .default_value(DEFAULT_SLICE_PREFIX),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Continue with the remaining long files after a per-file decode failure")
                .action(ArgAction::SetTrue),
        )
}
