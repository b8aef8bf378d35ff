//! Generate interactive HTML viewers from TMF8829 JSON logs

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tmf_log::logging::init_logging;
use tmf_log::{
    generate_viewer, print_viewer_report, process_directory, ViewerOptions, DEFAULT_TITLE,
};
use tracing::debug;

fn build_command() -> Command {
    Command::new("json_to_html")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate HTML visualization from TMF8829 JSON log")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to JSON file (or .json.gz) or directory containing JSON files")
                .value_name("PATH")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output HTML file path or directory (optional)")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .help("Page title")
                .value_name("TEXT")
                .default_value(DEFAULT_TITLE),
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
    init_logging("json_to_html", debug);
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        "json_to_html starting"
    );

    let input = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .context("missing --input")?;
    let output = matches.get_one::<String>("output").map(PathBuf::from);
    let options = ViewerOptions {
        title: matches
            .get_one::<String>("title")
            .cloned()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    };

    if input.is_dir() {
        let summary = process_directory(&input, output.as_deref(), &options)?;
        debug!(
            found = summary.found,
            succeeded = summary.success_count(),
            "batch finished"
        );
    } else if input.is_file() {
        let report = generate_viewer(&input, output.as_deref(), &options)
            .with_context(|| format!("Failed to generate viewer for {}", input.display()))?;
        print_viewer_report(&report);
    } else {
        bail!("{} is not a valid file or directory", input.display());
    }

    Ok(())
}
