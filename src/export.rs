//! CSV export of measurement logs
//!
//! Output layout, top to bottom:
//! - `sep=,` line for spreadsheet tools
//! - `#CONFIG` key row and value row, when the log has a `configuration`
//! - per frame: a `#PIXEL` results section and/or a `#RAWBIN` histogram
//!   section, in `Result_Set` order
//!
//! Rows may have differing lengths; see [`crate::flatten`].

use crate::flatten::{format_value, FrameFlattener, HeaderPolicy, RawCounterReset, CONFIG_TAG};
use crate::loader::load_log;
use crate::paths::{output_path, strip_log_suffix};
use crate::types::{MeasurementLog, CONFIGURATION_KEY};
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// First line of every report
pub const SEPARATOR_HINT: &str = "sep=,";

/// Export options for controlling CSV layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvExportOptions {
    pub header_policy: HeaderPolicy,
    pub raw_counter: RawCounterReset,
}

/// What a CSV export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSummary {
    pub frames: usize,
    pub config_written: bool,
    pub results_sections: usize,
    pub pixel_rows: usize,
    pub histogram_sections: usize,
    pub histogram_rows: usize,
}

/// `#CONFIG` key row and value row, or `None` without a `configuration`
/// mapping. A `configuration` key holding anything else is skipped with a
/// warning.
pub fn configuration_rows(log: &MeasurementLog) -> Option<(Vec<String>, Vec<String>)> {
    let Some(configuration) = log.configuration() else {
        if let Some(other) = log.as_value().get(CONFIGURATION_KEY) {
            warn!(value = %other, "configuration is not a mapping, #CONFIG section skipped");
        }
        return None;
    };

    let mut keys = Vec::with_capacity(configuration.len() + 1);
    let mut values = Vec::with_capacity(configuration.len() + 1);
    keys.push(CONFIG_TAG.to_string());
    values.push(CONFIG_TAG.to_string());
    for (key, value) in configuration {
        keys.push(key.clone());
        values.push(format_value(value));
    }
    Some((keys, values))
}

/// Write the full CSV report for `log` into `writer`
pub fn write_csv_report<W: Write>(
    log: &MeasurementLog,
    mut writer: W,
    options: &CsvExportOptions,
) -> Result<CsvSummary> {
    writeln!(writer, "{SEPARATOR_HINT}")?;

    // Records end in CRLF like the reference exporter; fields are quoted only
    // when needed. Rows are allowed to differ in length.
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let mut summary = CsvSummary {
        frames: log.frame_count(),
        ..CsvSummary::default()
    };

    if let Some((keys, values)) = configuration_rows(log) {
        csv_writer.write_record(&keys)?;
        csv_writer.write_record(&values)?;
        summary.config_written = true;
    }

    let mut flattener = FrameFlattener::new(options.header_policy, options.raw_counter);
    for frame in log.frames() {
        let flat = flattener.flatten_frame(&frame)?;

        if let Some(section) = flat.results {
            csv_writer.write_record(&section.header)?;
            for row in &section.rows {
                csv_writer.write_record(row)?;
            }
            summary.results_sections += 1;
            summary.pixel_rows += section.rows.len();
        }

        if let Some(section) = flat.raw_histograms {
            csv_writer.write_record(&section.header)?;
            for row in &section.rows {
                csv_writer.write_record(row)?;
            }
            summary.histogram_sections += 1;
            summary.histogram_rows += section.rows.len();
        }
    }

    csv_writer.flush()?;
    debug!(?summary, "CSV report written");
    Ok(summary)
}

/// Write the report for `log` to a file at `output_path`
pub fn export_log_to_csv(
    log: &MeasurementLog,
    output_path: &Path,
    options: &CsvExportOptions,
) -> Result<CsvSummary> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            debug!(dir = %parent.display(), "created output directory");
        }
    }

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    let summary = write_csv_report(log, &mut writer, options)?;
    writer.flush()?;

    info!(
        output = %output_path.display(),
        pixel_rows = summary.pixel_rows,
        histogram_rows = summary.histogram_rows,
        "CSV export complete"
    );
    Ok(summary)
}

/// Load `input_path` and write its report to `output_path`
pub fn export_file_to_csv(
    input_path: &Path,
    output_path: &Path,
    options: &CsvExportOptions,
) -> Result<CsvSummary> {
    let log = load_log(input_path)?;
    export_log_to_csv(&log, output_path, options)
}

/// Default report path: the input name with `.json.gz`/`.json` swapped for
/// `.csv`, next to the input or inside `output_dir`.
pub fn default_csv_path(input_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "measurement".to_string());
    let (stem, _) = strip_log_suffix(&file_name);
    output_path(input_path, output_dir, &format!("{stem}.csv"))
}
