//! Split a TMF8829 JSON log into parts by frame count

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tmf_log::logging::init_logging;
use tmf_log::{megabytes, split_file, SplitOptions, SplitReport, DEFAULT_FRAMES_PER_FILE};
use tracing::debug;

fn build_command() -> Command {
    Command::new("split_json")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Split TMF8829 JSON log file into multiple parts")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to input JSON file (supports both .json and .json.gz)")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Output directory (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("frames-per-file")
                .short('n')
                .long("frames-per-file")
                .help("Number of frames per output file")
                .value_name("N")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("50"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
}

fn print_report(report: &SplitReport) {
    for part in &report.parts {
        println!("✓ Created part {}: {}", part.plan.index, part.path.display());
        println!(
            "  Frames: {} to {} ({} frames)",
            part.plan.start,
            part.plan.end - 1,
            part.plan.frame_count()
        );
        println!("  Size: {:.2} MB", megabytes(part.size_bytes));
    }

    let input_name = report
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!();
    println!("Summary:");
    println!(
        "  Original file: {} ({:.2} MB, {} frames)",
        input_name,
        megabytes(report.original_size),
        report.total_frames
    );
    println!("  Created {} output file(s)", report.parts.len());
    for part in &report.parts {
        println!(
            "  Part {}: {} frames ({:.2} MB)",
            part.plan.index,
            part.plan.frame_count(),
            megabytes(part.size_bytes)
        );
    }
    println!(
        "  Total output size: {:.2} MB",
        megabytes(report.total_output_size())
    );
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    init_logging("split_json", debug);
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        "split_json starting"
    );

    let input = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .context("missing --input")?;
    let frames_per_file = matches
        .get_one::<u64>("frames-per-file")
        .copied()
        .unwrap_or(DEFAULT_FRAMES_PER_FILE as u64);
    let options = SplitOptions {
        frames_per_file: usize::try_from(frames_per_file)
            .context("--frames-per-file is too large")?,
        output_dir: matches.get_one::<String>("output-dir").map(PathBuf::from),
    };

    let report = split_file(&input, &options)
        .with_context(|| format!("Failed to split {}", input.display()))?;

    println!("Total frames in original file: {}", report.total_frames);
    println!("Frames per output file: {}", report.frames_per_file);
    println!("Will create {} output file(s)", report.parts.len());
    print_report(&report);

    for part in &report.parts {
        if let (Some(first), Some(last)) = (part.first_frame_number, part.last_frame_number) {
            debug!(part = part.plan.index, first, last, "frame numbers");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition() {
        build_command().debug_assert();
    }

    #[test]
    fn test_zero_frames_per_file_rejected() {
        assert!(build_command()
            .try_get_matches_from(["split_json", "-i", "x.json", "-n", "0"])
            .is_err());
    }

    #[test]
    fn test_default_frames_per_file() {
        let matches = build_command()
            .try_get_matches_from(["split_json", "-i", "x.json"])
            .unwrap();
        assert_eq!(
            matches.get_one::<u64>("frames-per-file"),
            Some(&(DEFAULT_FRAMES_PER_FILE as u64))
        );
    }
}
