//! Integration tests for CSV export
//!
//! Covers the full report layout over several frames:
//! - configuration section
//! - per-frame results sections with ragged peak rows
//! - raw histogram sections and their label counter
//! - gzip input and output directory creation

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tmf_log::{
    export_file_to_csv, export_log_to_csv, save_log, Compression, CsvExportOptions, HeaderPolicy,
    LogError, MeasurementLog, RawCounterReset,
};

fn fixture() -> Value {
    json!({
        "configuration": {"period": 10, "nr_peaks": 2},
        "Result_Set": [
            {
                "results": [[
                    {"noise": 1, "xtalk": 2, "peaks": [
                        {"distance": 100, "snr": 25, "signal": 7},
                        {"distance": 200, "snr": 5, "signal": 3}
                    ]},
                    {"noise": 3, "xtalk": 4, "peaks": [
                        {"distance": 101, "snr": 11, "signal": 8}
                    ]}
                ]],
                "mp_histo": [[{"bin": [1, 2, 3]}, {"bin": [4, 5]}]]
            },
            {"mp_histo": [[{"bin": [9]}]]},
            {"info": {"frame_number": 3}},
            {
                "results": [[{"noise": 6}]],
                "mp_histo": [[{"bin": [7]}]]
            }
        ]
    })
}

fn rawbin_header() -> String {
    let columns: Vec<String> = (0..64).map(|i| i.to_string()).collect();
    format!("#RAWBIN,{}", columns.join(","))
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read CSV")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_full_report_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("report.csv");
    let log = MeasurementLog::from_value(fixture());

    let summary = export_log_to_csv(&log, &output, &CsvExportOptions::default())
        .expect("export should succeed");

    let expected = vec![
        "sep=,".to_string(),
        "#CONFIG,period,nr_peaks".to_string(),
        "#CONFIG,10,2".to_string(),
        "#PIXEL,noise,xtalk,distance0,snr0,signal0,distance1,snr1,signal1".to_string(),
        "#PIXEL0000,1,2,100,25,7,200,5,3".to_string(),
        "#PIXEL0001,3,4,101,11,8".to_string(),
        rawbin_header(),
        "#RAW000,1,2,3".to_string(),
        "#RAW001,4,5".to_string(),
        rawbin_header(),
        "#RAW002,9".to_string(),
        "#PIXEL,noise".to_string(),
        "#PIXEL0000,6".to_string(),
        rawbin_header(),
        "#RAW000,7".to_string(),
    ];
    assert_eq!(read_lines(&output), expected);

    assert_eq!(summary.frames, 4);
    assert!(summary.config_written);
    assert_eq!(summary.results_sections, 2);
    assert_eq!(summary.pixel_rows, 3);
    assert_eq!(summary.histogram_sections, 3);
    assert_eq!(summary.histogram_rows, 4);
}

#[test]
fn test_global_raw_counter() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("report.csv");
    let log = MeasurementLog::from_value(fixture());
    let options = CsvExportOptions {
        raw_counter: RawCounterReset::Never,
        ..CsvExportOptions::default()
    };

    export_log_to_csv(&log, &output, &options).expect("export should succeed");

    let lines = read_lines(&output);
    assert_eq!(lines.last().map(String::as_str), Some("#RAW003,7"));
}

#[test]
fn test_strict_header_policy_rejects_ragged_cells() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("report.csv");
    let log = MeasurementLog::from_value(fixture());
    let options = CsvExportOptions {
        header_policy: HeaderPolicy::Strict,
        ..CsvExportOptions::default()
    };

    let result = export_log_to_csv(&log, &output, &options);
    assert!(matches!(result, Err(LogError::Schema(_))));
}

#[test]
fn test_missing_first_cell_is_schema_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("report.csv");
    let log = MeasurementLog::from_value(json!({"Result_Set": [{"results": [[]]}]}));

    let result = export_log_to_csv(&log, &output, &CsvExportOptions::default());
    assert!(matches!(result, Err(LogError::Schema(_))));
}

#[test]
fn test_gzip_input_matches_plain_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log = MeasurementLog::from_value(fixture());
    let plain = temp_dir.path().join("capture.json");
    let gzip = temp_dir.path().join("capture.json.gz");
    save_log(&plain, &log, Compression::Plain).expect("save plain");
    save_log(&gzip, &log, Compression::Gzip).expect("save gzip");

    let out_dir = temp_dir.path().join("nested").join("out");
    let plain_csv = out_dir.join("plain.csv");
    let gzip_csv = out_dir.join("gzip.csv");
    export_file_to_csv(&plain, &plain_csv, &CsvExportOptions::default()).expect("plain export");
    export_file_to_csv(&gzip, &gzip_csv, &CsvExportOptions::default()).expect("gzip export");

    assert!(out_dir.is_dir(), "output directory should be created");
    assert_eq!(
        fs::read(&plain_csv).unwrap(),
        fs::read(&gzip_csv).unwrap()
    );
}

#[test]
fn test_missing_input_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = export_file_to_csv(
        &temp_dir.path().join("missing.json"),
        &temp_dir.path().join("out.csv"),
        &CsvExportOptions::default(),
    );
    assert!(matches!(result, Err(LogError::Io(_))));
}

#[test]
fn test_corrupt_gzip_is_decompression_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("broken.json.gz");
    fs::write(&input, b"this is not gzip").unwrap();

    let result = export_file_to_csv(
        &input,
        &temp_dir.path().join("out.csv"),
        &CsvExportOptions::default(),
    );
    assert!(matches!(result, Err(LogError::Decompression(_))));
}
