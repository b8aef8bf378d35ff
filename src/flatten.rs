//! Schema-driven flattening of frames into CSV-shaped rows
//!
//! Column headers for a results section come from one reference cell,
//! `results[0][0]` of the frame being flattened. Every other cell is written
//! with whatever keys it actually carries, so a cell shaped differently from
//! the reference yields a ragged row. [`HeaderPolicy::Strict`] turns that
//! situation into an error instead.
//!
//! Raw histogram rows are labelled from a counter that spans frames. Whether
//! a results section resets that counter is an explicit [`RawCounterReset`]
//! setting.

use crate::types::{CellView, FrameView};
use crate::{LogError, Result};
use serde_json::Value;
use tracing::debug;

pub const CONFIG_TAG: &str = "#CONFIG";
pub const PIXEL_TAG: &str = "#PIXEL";
pub const RAW_BIN_TAG: &str = "#RAWBIN";
pub const RAW_TAG: &str = "#RAW";

/// Number of bin columns in the raw histogram header
pub const RAW_BIN_COUNT: usize = 64;

/// How results headers relate to the cells underneath them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// Header from `results[0][0]`; other cells are written as they are
    #[default]
    FirstWins,
    /// Header from `results[0][0]`; any cell with a different column set fails
    Strict,
}

/// When the raw histogram label counter starts over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawCounterReset {
    /// Back to zero whenever a frame with a results section is flattened
    #[default]
    OnResults,
    /// Counts across the whole document
    Never,
}

/// Running counter behind the `#RAWnnn` labels
#[derive(Debug, Clone)]
pub struct RawHistogramCounter {
    next: usize,
    reset: RawCounterReset,
}

impl RawHistogramCounter {
    pub fn new(reset: RawCounterReset) -> Self {
        Self { next: 0, reset }
    }

    /// Value the next label will carry
    pub fn current(&self) -> usize {
        self.next
    }

    /// Called once per results section
    pub fn on_results_section(&mut self) {
        if self.reset == RawCounterReset::OnResults {
            self.next = 0;
        }
    }

    pub fn next_label(&mut self) -> String {
        let label = raw_label(self.next);
        self.next += 1;
        label
    }
}

/// A header row followed by its data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything one frame contributes to the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatFrame {
    pub results: Option<Section>,
    pub raw_histograms: Option<Section>,
}

impl FlatFrame {
    pub fn is_empty(&self) -> bool {
        self.results.is_none() && self.raw_histograms.is_none()
    }
}

/// Flattens frames one after another, carrying the raw histogram counter
/// between them.
#[derive(Debug, Clone)]
pub struct FrameFlattener {
    policy: HeaderPolicy,
    counter: RawHistogramCounter,
}

impl FrameFlattener {
    pub fn new(policy: HeaderPolicy, reset: RawCounterReset) -> Self {
        Self {
            policy,
            counter: RawHistogramCounter::new(reset),
        }
    }

    pub fn counter(&self) -> &RawHistogramCounter {
        &self.counter
    }

    pub fn flatten_frame(&mut self, frame: &FrameView<'_>) -> Result<FlatFrame> {
        let results = flatten_results(frame, self.policy)?;
        if results.is_some() {
            self.counter.on_results_section();
        }
        let raw_histograms = flatten_raw_histograms(frame, &mut self.counter);

        debug!(
            frame = frame.index(),
            pixels = results.as_ref().map(|s| s.rows.len()).unwrap_or(0),
            histograms = raw_histograms.as_ref().map(|s| s.rows.len()).unwrap_or(0),
            "frame flattened"
        );

        Ok(FlatFrame {
            results,
            raw_histograms,
        })
    }
}

impl Default for FrameFlattener {
    fn default() -> Self {
        Self::new(HeaderPolicy::default(), RawCounterReset::default())
    }
}

/// `#PIXEL0042`
pub fn pixel_label(pixel: usize) -> String {
    format!("{PIXEL_TAG}{pixel:04}")
}

/// `#RAW007`
pub fn raw_label(index: usize) -> String {
    format!("{RAW_TAG}{index:03}")
}

/// Text written into a CSV field for a JSON value.
///
/// Strings go out without quotes, numbers as their JSON text, `null` as an
/// empty field, lists and mappings as compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Column names a cell carries, in output order (without the pixel column)
pub fn cell_columns(cell: CellView<'_>) -> Vec<String> {
    let mut columns = Vec::new();
    if cell.noise().is_some() {
        columns.push("noise".to_string());
    }
    if cell.xtalk().is_some() {
        columns.push("xtalk".to_string());
    }
    for (i, peak) in cell.peaks().enumerate() {
        if peak.distance().is_some() {
            columns.push(format!("distance{i}"));
        }
        if peak.snr().is_some() {
            columns.push(format!("snr{i}"));
        }
        if peak.signal().is_some() {
            columns.push(format!("signal{i}"));
        }
    }
    columns
}

/// Results header for a frame, derived from `results[0][0]` alone.
///
/// `Ok(None)` when the frame has no `results`; a schema error when `results`
/// is present but has no first cell.
pub fn results_header(frame: &FrameView<'_>) -> Result<Option<Vec<String>>> {
    let Some(grid) = frame.results() else {
        return Ok(None);
    };
    let reference = grid.first().ok_or_else(|| {
        LogError::Schema(format!(
            "frame {} has a results section without a results[0][0] cell",
            frame.index()
        ))
    })?;

    let mut header = vec![PIXEL_TAG.to_string()];
    header.extend(cell_columns(CellView::new(reference)));
    Ok(Some(header))
}

/// Data row for one cell: pixel label, then the values the cell carries
pub fn flatten_cell(cell: CellView<'_>, pixel: usize) -> Vec<String> {
    let mut row = vec![pixel_label(pixel)];
    if let Some(noise) = cell.noise() {
        row.push(format_value(noise));
    }
    if let Some(xtalk) = cell.xtalk() {
        row.push(format_value(xtalk));
    }
    for peak in cell.peaks() {
        for field in [peak.distance(), peak.snr(), peak.signal()]
            .into_iter()
            .flatten()
        {
            row.push(format_value(field));
        }
    }
    row
}

/// Header plus one row per cell, row-major, pixels numbered from zero
pub fn flatten_results(frame: &FrameView<'_>, policy: HeaderPolicy) -> Result<Option<Section>> {
    let Some(header) = results_header(frame)? else {
        return Ok(None);
    };
    let Some(grid) = frame.results() else {
        return Ok(None);
    };

    let mut rows = Vec::with_capacity(grid.len());
    for (pixel, cell) in grid.cells().enumerate() {
        if policy == HeaderPolicy::Strict {
            let columns = cell_columns(cell);
            if columns[..] != header[1..] {
                return Err(LogError::Schema(format!(
                    "frame {} pixel {} has columns [{}] but results[0][0] defines [{}]",
                    frame.index(),
                    pixel,
                    columns.join(","),
                    header[1..].join(",")
                )));
            }
        }
        rows.push(flatten_cell(cell, pixel));
    }

    Ok(Some(Section { header, rows }))
}

/// `#RAWBIN,0..63` header plus one labelled row per `mp_histo` record
pub fn flatten_raw_histograms(
    frame: &FrameView<'_>,
    counter: &mut RawHistogramCounter,
) -> Option<Section> {
    let grid = frame.mp_histo()?;

    let mut header = Vec::with_capacity(RAW_BIN_COUNT + 1);
    header.push(RAW_BIN_TAG.to_string());
    header.extend((0..RAW_BIN_COUNT).map(|i| i.to_string()));

    let rows = grid
        .histograms()
        .map(|histogram| {
            let mut row = vec![counter.next_label()];
            if let Some(bins) = histogram.bins() {
                row.extend(bins.iter().map(format_value));
            }
            row
        })
        .collect();

    Some(Section { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame_value() -> Value {
        json!({
            "results": [
                [
                    {"noise": 5, "peaks": [{"distance": 100, "snr": 25}, {"distance": 200, "snr": 8}]},
                    {"noise": 6, "xtalk": 1, "peaks": [{"distance": 101, "snr": 24, "signal": 3}]}
                ],
                [
                    {"noise": 7, "peaks": [{"distance": 102, "snr": 23}, {"distance": 202, "snr": 9}]},
                    {"noise": 8, "peaks": []}
                ]
            ]
        })
    }

    #[test]
    fn test_header_comes_from_first_cell_only() {
        let value = frame_value();
        let frame = FrameView::new(0, &value);
        let header = results_header(&frame).unwrap().unwrap();
        assert_eq!(
            header.join(","),
            "#PIXEL,noise,distance0,snr0,distance1,snr1"
        );
    }

    #[test]
    fn test_first_wins_produces_ragged_rows() {
        let value = frame_value();
        let frame = FrameView::new(0, &value);
        let section = flatten_results(&frame, HeaderPolicy::FirstWins)
            .unwrap()
            .unwrap();

        assert_eq!(section.rows.len(), 4);
        assert_eq!(section.rows[0], vec!["#PIXEL0000", "5", "100", "25", "200", "8"]);
        assert_eq!(section.rows[1], vec!["#PIXEL0001", "6", "1", "101", "24", "3"]);
        assert_eq!(section.rows[3], vec!["#PIXEL0003", "8"]);
    }

    #[test]
    fn test_strict_policy_rejects_mismatched_cell() {
        let value = frame_value();
        let frame = FrameView::new(4, &value);
        let err = flatten_results(&frame, HeaderPolicy::Strict).unwrap_err();
        match err {
            LogError::Schema(msg) => {
                assert!(msg.contains("frame 4 pixel 1"), "unexpected message: {msg}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_policy_accepts_uniform_frame() {
        let value = json!({"results": [[{"noise": 1, "xtalk": 2}, {"noise": 3, "xtalk": 4}]]});
        let frame = FrameView::new(0, &value);
        let section = flatten_results(&frame, HeaderPolicy::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(section.header, vec!["#PIXEL", "noise", "xtalk"]);
        assert_eq!(section.rows[1], vec!["#PIXEL0001", "3", "4"]);
    }

    #[test]
    fn test_missing_reference_cell_is_schema_error() {
        let value = json!({"results": [[]]});
        let frame = FrameView::new(2, &value);
        assert!(matches!(
            results_header(&frame),
            Err(LogError::Schema(_))
        ));

        let value = json!({"results": []});
        let frame = FrameView::new(2, &value);
        assert!(matches!(
            flatten_results(&frame, HeaderPolicy::FirstWins),
            Err(LogError::Schema(_))
        ));
    }

    #[test]
    fn test_cell_without_xtalk_contributes_no_xtalk() {
        let value = json!({"results": [[{"noise": 1}, {"noise": 2, "xtalk": 9}]]});
        let frame = FrameView::new(0, &value);
        let section = flatten_results(&frame, HeaderPolicy::FirstWins)
            .unwrap()
            .unwrap();
        assert_eq!(section.header, vec!["#PIXEL", "noise"]);
        assert_eq!(section.rows[0], vec!["#PIXEL0000", "1"]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(5)), "5");
        assert_eq!(format_value(&json!(2.5)), "2.5");
        assert_eq!(format_value(&json!("abc")), "abc");
        assert_eq!(format_value(&json!(null)), "");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!([1, 2, 3])), "[1,2,3]");
    }

    #[test]
    fn test_labels_are_zero_padded() {
        assert_eq!(pixel_label(0), "#PIXEL0000");
        assert_eq!(pixel_label(63), "#PIXEL0063");
        assert_eq!(pixel_label(12345), "#PIXEL12345");
        assert_eq!(raw_label(7), "#RAW007");
        assert_eq!(raw_label(1000), "#RAW1000");
    }

    #[test]
    fn test_raw_histogram_header_and_rows() {
        let value = json!({"mp_histo": [[{"bin": [1, 2, 3]}, {"bin": [4]}], [{"bin": []}]]});
        let frame = FrameView::new(0, &value);
        let mut counter = RawHistogramCounter::new(RawCounterReset::OnResults);
        let section = flatten_raw_histograms(&frame, &mut counter).unwrap();

        assert_eq!(section.header.len(), RAW_BIN_COUNT + 1);
        assert_eq!(section.header[0], "#RAWBIN");
        assert_eq!(section.header[64], "63");
        assert_eq!(section.rows[0], vec!["#RAW000", "1", "2", "3"]);
        assert_eq!(section.rows[1], vec!["#RAW001", "4"]);
        assert_eq!(section.rows[2], vec!["#RAW002"]);
        assert_eq!(counter.current(), 3);
    }

    #[test]
    fn test_counter_resets_only_on_results_sections() {
        let histo_only = json!({"mp_histo": [[{"bin": [1]}, {"bin": [2]}]]});
        let with_results = json!({
            "results": [[{"noise": 1}]],
            "mp_histo": [[{"bin": [1]}]]
        });

        let mut flattener = FrameFlattener::new(HeaderPolicy::FirstWins, RawCounterReset::OnResults);
        flattener
            .flatten_frame(&FrameView::new(0, &histo_only))
            .unwrap();
        let second = flattener
            .flatten_frame(&FrameView::new(1, &histo_only))
            .unwrap();
        assert_eq!(second.raw_histograms.unwrap().rows[0][0], "#RAW002");

        let third = flattener
            .flatten_frame(&FrameView::new(2, &with_results))
            .unwrap();
        assert_eq!(third.raw_histograms.unwrap().rows[0][0], "#RAW000");
    }

    #[test]
    fn test_counter_never_reset() {
        let with_results = json!({
            "results": [[{"noise": 1}]],
            "mp_histo": [[{"bin": [1]}, {"bin": [2]}]]
        });

        let mut flattener = FrameFlattener::new(HeaderPolicy::FirstWins, RawCounterReset::Never);
        flattener
            .flatten_frame(&FrameView::new(0, &with_results))
            .unwrap();
        let second = flattener
            .flatten_frame(&FrameView::new(1, &with_results))
            .unwrap();
        let rows = second.raw_histograms.unwrap().rows;
        assert_eq!(rows[0][0], "#RAW002");
        assert_eq!(rows[1][0], "#RAW003");
        assert_eq!(flattener.counter().current(), 4);
    }

    #[test]
    fn test_frame_without_sections_is_empty() {
        let value = json!({"info": {"frame_number": 1}, "ref_histo": [{"bin": [1]}]});
        let mut flattener = FrameFlattener::default();
        let flat = flattener.flatten_frame(&FrameView::new(0, &value)).unwrap();
        assert!(flat.is_empty());
    }
}
