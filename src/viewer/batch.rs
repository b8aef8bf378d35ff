//! Directory batch mode for the viewer
//!
//! Every log file directly inside the input directory gets its own page.
//! A failing file is reported and skipped; the batch carries on.

use super::{generate_viewer, print_viewer_report, ViewerOptions};
use crate::paths::{find_log_files, output_path, strip_log_suffix, LogSuffix};
use crate::{LogError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SEPARATOR_WIDTH: usize = 50;

/// Outcome of a directory batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Log files found in the directory
    pub found: usize,
    /// Pages written
    pub succeeded: Vec<PathBuf>,
    /// Inputs that failed, with their error
    pub failures: Vec<(PathBuf, LogError)>,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch page name: `<stem>_gz_viewer.html` for `.json.gz`, else `<stem>_viewer.html`
pub fn batch_viewer_name(file_name: &str) -> String {
    match strip_log_suffix(file_name) {
        (stem, LogSuffix::JsonGz) => format!("{stem}_gz_viewer.html"),
        (stem, _) => format!("{stem}_viewer.html"),
    }
}

/// Page path for `input`: inside `output_dir` when given, else next to it
pub fn batch_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = batch_viewer_name(&file_name);
    output_path(input, output_dir, &name)
}

/// Render a page for every log file in `input_dir`
pub fn process_directory(
    input_dir: &Path,
    output_dir: Option<&Path>,
    options: &ViewerOptions,
) -> Result<BatchSummary> {
    let files = find_log_files(input_dir)?;

    if let Some(dir) = output_dir {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created output directory: {}", dir.display());
        }
    }

    let mut summary = BatchSummary {
        found: files.len(),
        ..BatchSummary::default()
    };
    if files.is_empty() {
        println!("No JSON files found in {}", input_dir.display());
        return Ok(summary);
    }

    println!(
        "Found {} JSON file(s) in {}",
        files.len(),
        input_dir.display()
    );
    println!("{}", "-".repeat(SEPARATOR_WIDTH));

    for input in files {
        let output = batch_output_path(&input, output_dir);
        debug!(input = %input.display(), output = %output.display(), "batch item");
        match generate_viewer(&input, Some(output.as_path()), options) {
            Ok(report) => {
                print_viewer_report(&report);
                summary.succeeded.push(report.output);
            }
            Err(e) => {
                println!("Error processing {}: {}", input.display(), e);
                warn!(input = %input.display(), error = %e, "batch item failed");
                summary.failures.push((input, e));
            }
        }
    }

    println!("{}", "-".repeat(SEPARATOR_WIDTH));
    println!(
        "Successfully processed {}/{} file(s)",
        summary.success_count(),
        summary.found
    );
    Ok(summary)
}
