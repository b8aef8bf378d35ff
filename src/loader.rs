//! Reading and writing measurement log documents
//!
//! A log is either plain UTF-8 JSON or the same JSON wrapped in gzip. The
//! form is chosen by file name: anything ending in `.gz` is compressed.
//! Loading is all-or-nothing; a document is either fully parsed or an error
//! is returned.

use crate::types::MeasurementLog;
use crate::{LogError, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// On-disk form of a log document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let is_gzip = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(".gz"))
            .unwrap_or(false);
        if is_gzip {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }

    /// Extension written for split parts in this form
    pub fn part_extension(&self) -> &'static str {
        match self {
            Compression::Plain => ".json",
            Compression::Gzip => ".json.gz",
        }
    }
}

/// Load a log from `path`, decompressing when the name ends in `.gz`
pub fn load_log(path: &Path) -> Result<MeasurementLog> {
    let compression = Compression::from_path(path);
    debug!(path = %path.display(), ?compression, "loading measurement log");

    let file = File::open(path)?;
    let log = read_log(file, compression)?;

    debug!(frames = log.frame_count(), "measurement log loaded");
    Ok(log)
}

/// Read a complete log document from any reader
pub fn read_log<R: Read>(mut reader: R, compression: Compression) -> Result<MeasurementLog> {
    let bytes = match compression {
        Compression::Plain => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            bytes
        }
        Compression::Gzip => {
            // Appended captures are concatenated gzip members
            let mut decoder = MultiGzDecoder::new(reader);
            let mut bytes = Vec::new();
            decoder
                .read_to_end(&mut bytes)
                .map_err(LogError::Decompression)?;
            bytes
        }
    };
    parse_log_bytes(&bytes)
}

/// Decode UTF-8 text and parse it as a JSON document
pub fn parse_log_bytes(bytes: &[u8]) -> Result<MeasurementLog> {
    let text = std::str::from_utf8(bytes)?;
    let document = serde_json::from_str(text)?;
    Ok(MeasurementLog::from_value(document))
}

/// Write `log` to `path` as 2-space indented UTF-8 JSON, gzip-wrapped for
/// [`Compression::Gzip`]. Returns the size of the written file in bytes.
pub fn save_log(path: &Path, log: &MeasurementLog, compression: Compression) -> Result<u64> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    match compression {
        Compression::Plain => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, log.as_value())?;
            writer.flush()?;
        }
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
            serde_json::to_writer_pretty(&mut encoder, log.as_value())?;
            encoder.finish()?.flush()?;
        }
    }

    let size = std::fs::metadata(path)?.len();
    debug!(path = %path.display(), size, ?compression, "log written");
    Ok(size)
}
