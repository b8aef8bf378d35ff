//! Integration tests for the HTML viewer

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tmf_log::{
    generate_viewer, process_directory, save_log, Compression, MeasurementLog, ViewerOptions,
};

fn capture() -> MeasurementLog {
    MeasurementLog::from_value(json!({
        "configuration": {"period": 33, "nr_peaks": 3},
        "info": [{"host version": [1, 4], "fw version": "2.0.1", "logger version": 3}],
        "Result_Set": [
            {
                "info": {"frame_number": 1, "warnings": 1, "systick_t0": 99},
                "results": [[{"noise": 1, "peaks": [{"distance": 10, "snr": 30}]}]],
                "ref_histo": [{"bin": [5, 6, 7]}]
            },
            {
                "info": {"frame_number": 2},
                "results": [[{"noise": 2}]],
                "mp_histo": [[{"bin": [1]}]]
            }
        ]
    }))
}

fn embedded_payload(html: &str) -> Value {
    let start_tag = r#"<script type="application/json" id="log-data">"#;
    let start = html.find(start_tag).expect("payload script") + start_tag.len();
    let end = start + html[start..].find("</script>").expect("payload end");
    serde_json::from_str(&html[start..end]).expect("payload should be JSON")
}

#[test]
fn test_generate_viewer_for_gzip_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("capture.json.gz");
    save_log(&input, &capture(), Compression::Gzip).expect("save input");

    let report = generate_viewer(&input, None, &ViewerOptions::default())
        .expect("viewer should be generated");

    assert_eq!(report.output, temp_dir.path().join("capture_viewer.html"));
    assert_eq!(report.frames, 2);

    let html = fs::read_to_string(&report.output).unwrap();
    assert!(html.contains("<title>TMF8829 JSON Viewer</title>"));
    assert!(html.contains("Host: 1.4 | FW: 2.0.1 | Logger: 3 | Serial: N/A"));

    let payload = embedded_payload(&html);
    assert_eq!(payload["frames"], capture().as_value()["Result_Set"]);
    assert_eq!(payload["initialHistogram"], json!("ref"));
    assert_eq!(payload["options"]["peaksToShow"], json!(3));
    assert_eq!(payload["thresholds"]["high"], json!(20.0));
}

#[test]
fn test_generate_viewer_explicit_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("capture.json");
    save_log(&input, &capture(), Compression::Plain).expect("save input");
    let output = temp_dir.path().join("pages").join("custom.html");

    let options = ViewerOptions {
        title: "Bench run".to_string(),
    };
    let report = generate_viewer(&input, Some(output.as_path()), &options).expect("viewer");

    assert_eq!(report.output, output);
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<h1>Bench run</h1>"));
}

#[test]
fn test_directory_batch_names() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = TempDir::new().expect("Failed to create temp dir");
    save_log(
        &input_dir.path().join("a.json"),
        &capture(),
        Compression::Plain,
    )
    .unwrap();
    save_log(
        &input_dir.path().join("b.json.gz"),
        &capture(),
        Compression::Gzip,
    )
    .unwrap();

    let summary = process_directory(
        input_dir.path(),
        Some(output_dir.path()),
        &ViewerOptions::default(),
    )
    .expect("batch should run");

    assert_eq!(summary.found, 2);
    assert_eq!(summary.success_count(), 2);
    assert!(output_dir.path().join("a_viewer.html").is_file());
    assert!(output_dir.path().join("b_gz_viewer.html").is_file());
}

#[test]
fn test_empty_directory_batch() {
    let input_dir = TempDir::new().expect("Failed to create temp dir");
    let summary = process_directory(input_dir.path(), None, &ViewerOptions::default())
        .expect("batch should run");
    assert_eq!(summary.found, 0);
    assert!(summary.all_succeeded());
}
