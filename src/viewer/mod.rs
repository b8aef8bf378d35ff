//! Interactive HTML viewer
//!
//! The page is a single self-contained document. The raw `Result_Set`,
//! `configuration` and device info are embedded as a JSON blob and the page
//! script renders one frame at a time from it.

pub mod batch;
pub mod display;
pub mod template;

pub use batch::*;
pub use display::*;

use crate::loader::load_log;
use crate::paths::{output_path, strip_log_suffix};
use crate::types::MeasurementLog;
use crate::{LogError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use template::{fill_template, VIEWER_TEMPLATE};
use tracing::debug;

pub const DEFAULT_TITLE: &str = "TMF8829 JSON Viewer";

/// Viewer generation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOptions {
    /// Page title and heading
    pub title: String,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// A generated viewer page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerReport {
    pub output: PathBuf,
    pub frames: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Thresholds {
    high: f64,
    medium: f64,
    field_width: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewerPayload<'a> {
    frames: &'a [Value],
    configuration: Value,
    device_info: Value,
    options: DisplayOptions,
    thresholds: Thresholds,
    classes: ConfidenceClasses,
    histogram_colors: HistogramColors,
    initial_histogram: Option<HistogramKind>,
}

/// Escape text for HTML element content and attribute values
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Make serialized JSON safe inside `<script type="application/json">`.
///
/// `\u003c` is a valid JSON escape for `<`, so `</script>` and `<!--` can
/// never appear in the embedded text.
pub fn escape_json_for_html_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Render the complete viewer page for `log`
pub fn render_viewer_html(log: &MeasurementLog, options: &ViewerOptions) -> Result<String> {
    let configuration = log.configuration();
    let device_info = log.device_info();
    let initial_histogram = log.frame(0).and_then(|frame| histogram_availability(&frame));

    let payload = ViewerPayload {
        frames: log.result_set(),
        configuration: Value::Object(configuration.cloned().unwrap_or_else(Map::new)),
        device_info: device_info.to_value(),
        options: DisplayOptions::for_configuration(configuration),
        thresholds: Thresholds {
            high: HIGH_CONFIDENCE_SNR,
            medium: MEDIUM_CONFIDENCE_SNR,
            field_width: PEAK_FIELD_WIDTH,
        },
        classes: ConfidenceClasses::default(),
        histogram_colors: HistogramColors::default(),
        initial_histogram,
    };
    let json = serde_json::to_string(&payload)
        .map_err(|e| LogError::Export(format!("cannot serialize viewer data: {e}")))?;

    let title = html_escape(&options.title);
    let version_text = html_escape(&format!("Version Information: {}", device_info.summary()));
    let frame_max = log.frame_count().saturating_sub(1).to_string();
    let payload = escape_json_for_html_script(&json);
    let histo_disabled = if initial_histogram.is_some() { "" } else { "disabled" };

    debug!(
        frames = log.frame_count(),
        payload_bytes = payload.len(),
        ?initial_histogram,
        "viewer page rendered"
    );

    Ok(fill_template(
        VIEWER_TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("VERSION_TEXT", version_text.as_str()),
            ("HISTO_DISABLED", histo_disabled),
            ("FRAME_MAX", frame_max.as_str()),
            ("PAYLOAD", payload.as_str()),
        ],
    ))
}

/// Default page path for a single input: `<stem>_viewer.html` next to it
pub fn default_viewer_path(input_path: &Path) -> PathBuf {
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, _) = strip_log_suffix(&file_name);
    output_path(input_path, None, &format!("{stem}_viewer.html"))
}

/// Write the viewer page for `log` to `output`
pub fn write_viewer(
    log: &MeasurementLog,
    output: &Path,
    options: &ViewerOptions,
) -> Result<ViewerReport> {
    let html = render_viewer_html(log, options)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, html)?;

    Ok(ViewerReport {
        output: output.to_path_buf(),
        frames: log.frame_count(),
    })
}

/// Load `input` and write its viewer page, to `output` or the default path
pub fn generate_viewer(
    input: &Path,
    output: Option<&Path>,
    options: &ViewerOptions,
) -> Result<ViewerReport> {
    let log = load_log(input)?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_viewer_path(input),
    };
    write_viewer(&log, &output, options)
}

/// Status lines printed after a page is written
pub fn print_viewer_report(report: &ViewerReport) {
    println!("HTML viewer generated: {}", report.output.display());
    println!("Total frames: {}", report.frames);
    println!("Open the HTML file in a web browser to view the data.");
}
