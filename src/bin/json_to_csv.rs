//! Convert TMF8829 JSON logs into CSV reports

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::time::Instant;
use tmf_log::logging::init_logging;
use tmf_log::{
    default_csv_path, expand_inputs, export_file_to_csv, CsvExportOptions, HeaderPolicy,
    RawCounterReset,
};
use tracing::debug;

fn build_command() -> Command {
    Command::new("json_to_csv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert a TMF8829 JSON log (.json or .json.gz) into a CSV report")
        .arg(
            Arg::new("input")
                .help("Input log file (.json or .json.gz)")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Output CSV file (default: input name with .csv)")
                .index(2),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .help("Convert several logs: files, directories or glob patterns. Each report is written next to its input, or into --output-dir")
                .value_name("INPUTS")
                .num_args(1..)
                .conflicts_with_all(["input", "output"]),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for CSV files (default: same as input file)")
                .value_name("DIR")
                .conflicts_with("output"),
        )
        .arg(
            Arg::new("strict-schema")
                .long("strict-schema")
                .help("Fail when a cell's columns differ from the header taken from the first cell")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("global-raw-counter")
                .long("global-raw-counter")
                .help("Number #RAW histogram rows across the whole file instead of restarting at each results section")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    init_logging("json_to_csv", debug);
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        "json_to_csv starting"
    );

    let options = CsvExportOptions {
        header_policy: if matches.get_flag("strict-schema") {
            HeaderPolicy::Strict
        } else {
            HeaderPolicy::FirstWins
        },
        raw_counter: if matches.get_flag("global-raw-counter") {
            RawCounterReset::Never
        } else {
            RawCounterReset::OnResults
        },
    };
    let output_dir = matches.get_one::<String>("output-dir").map(PathBuf::from);

    let jobs: Vec<(PathBuf, PathBuf)> = if let Some(batch) = matches.get_many::<String>("batch") {
        let patterns: Vec<&String> = batch.collect();
        let inputs = expand_inputs(&patterns)?;
        if inputs.is_empty() {
            bail!("no .json or .json.gz files found in {patterns:?}");
        }
        inputs
            .into_iter()
            .map(|input| {
                let output = default_csv_path(&input, output_dir.as_deref());
                (input, output)
            })
            .collect()
    } else {
        match matches.get_one::<String>("input") {
            Some(input) => {
                let input = PathBuf::from(input);
                let output = match matches.get_one::<String>("output") {
                    Some(output) => PathBuf::from(output),
                    None => default_csv_path(&input, output_dir.as_deref()),
                };
                vec![(input, output)]
            }
            None => {
                build_command().print_help()?;
                println!();
                return Ok(());
            }
        }
    };

    let start = Instant::now();
    for (input, output) in &jobs {
        let summary = export_file_to_csv(input, output, &options)
            .with_context(|| format!("Failed to convert {}", input.display()))?;
        debug!(input = %input.display(), ?summary, "converted");
        println!("Data written to {}", output.display());
    }
    println!(
        "Conversion finished in {:.3} s",
        start.elapsed().as_secs_f64()
    );

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
    fn test_batch_conflicts_with_positional() {
        let result =
            build_command().try_get_matches_from(["json_to_csv", "a.json", "--batch", "b.json"]);
        assert!(result.is_err());
    }
}
