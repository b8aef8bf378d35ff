//! TMF8829 Measurement Log Library
//!
//! A Rust library for working with JSON measurement logs recorded from
//! TMF8829 time-of-flight sensors. Logs are plain JSON or gzip-compressed
//! JSON holding a `configuration` mapping, device `info` and a `Result_Set`
//! of frames with per-pixel results and histograms.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export functionality
//! - **`cli`** (default): Build the command-line tools and the `tracing` subscriber setup
//!
//! # Quick Start
//!
//! Load a log and walk its frames:
//! ```rust,no_run
//! use tmf_log::load_log;
//! use std::path::Path;
//!
//! let log = load_log(Path::new("capture.json.gz")).unwrap();
//! println!("Loaded {} frames", log.frame_count());
//! for frame in log.frames() {
//!     if let Some((cols, rows)) = frame.resolution() {
//!         println!("frame {}: {}x{}", frame.index(), cols, rows);
//!     }
//! }
//! ```
//!
//! Export to CSV format:
//! ```rust,no_run
//! use tmf_log::{export_file_to_csv, default_csv_path, CsvExportOptions};
//! use std::path::Path;
//!
//! let input = Path::new("capture.json");
//! let output = default_csv_path(input, None);
//! let summary = export_file_to_csv(input, &output, &CsvExportOptions::default()).unwrap();
//! println!("{} pixel rows written to {}", summary.pixel_rows, output.display());
//! ```
//!
//! Split a long capture:
//! ```rust,no_run
//! use tmf_log::{split_file, SplitOptions};
//! use std::path::Path;
//!
//! let report = split_file(Path::new("capture.json"), &SplitOptions::default()).unwrap();
//! println!("{} parts", report.parts.len());
//! ```
//!
//! # Public API
//!
//! ## Loading
//! - [`load_log`] - Load a plain or gzip-compressed log file
//! - [`read_log`] - Load from any reader
//! - [`save_log`] - Write a log document, optionally compressed
//!
//! ## Data Types
//! - [`MeasurementLog`] - Complete log document
//! - [`FrameView`] - One `Result_Set` entry
//! - [`CellView`] / [`PeakView`] - Per-pixel results and their peaks
//! - [`HistogramView`] - Histogram record with `bin` counts
//! - [`DeviceInfo`] - Version banner fields
//!
//! ## Export Functions
//! - [`write_csv_report`] - Flatten a log into CSV on any writer
//! - [`export_file_to_csv`] - Load and export in one step
//! - [`render_viewer_html`] - Build the interactive HTML viewer page
//! - [`process_directory`] - Viewer batch over a directory
//! - [`split_file`] - Split a log into parts by frame count

// Module declarations
pub mod error;
#[cfg(feature = "csv")]
pub mod export;
pub mod flatten;
pub mod loader;
#[cfg(feature = "cli")]
pub mod logging;
pub mod paths;
pub mod split;
pub mod types;
pub mod viewer;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[cfg(feature = "csv")]
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use flatten::*;
#[allow(ambiguous_glob_reexports)]
pub use loader::*;
#[allow(ambiguous_glob_reexports)]
pub use paths::*;
#[allow(ambiguous_glob_reexports)]
pub use split::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
#[allow(ambiguous_glob_reexports)]
pub use viewer::*;
