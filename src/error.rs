use std::fmt;

/// Error type for loading, flattening and writing measurement logs
#[derive(Debug)]
pub enum LogError {
    /// File missing, unreadable or unwritable
    Io(std::io::Error),
    /// Document bytes are not valid UTF-8
    Utf8(std::str::Utf8Error),
    /// Document is not valid JSON
    Parse(serde_json::Error),
    /// Compressed input has broken gzip framing or a corrupt stream
    Decompression(std::io::Error),
    /// The document does not have the shape an operation relies on
    Schema(String),
    /// CSV writer failure
    #[cfg(feature = "csv")]
    Csv(csv::Error),
    /// Export format error
    Export(String),
    /// Rejected caller-supplied argument
    InvalidArgument(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(err) => write!(f, "I/O error: {}", err),
            LogError::Utf8(err) => write!(f, "UTF-8 error: {}", err),
            LogError::Parse(err) => write!(f, "JSON parse error: {}", err),
            LogError::Decompression(err) => write!(f, "gzip decompression error: {}", err),
            LogError::Schema(msg) => write!(f, "Schema assumption violated: {}", msg),
            #[cfg(feature = "csv")]
            LogError::Csv(err) => write!(f, "CSV error: {}", err),
            LogError::Export(msg) => write!(f, "Export error: {}", msg),
            LogError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(err) => Some(err),
            LogError::Utf8(err) => Some(err),
            LogError::Parse(err) => Some(err),
            LogError::Decompression(err) => Some(err),
            #[cfg(feature = "csv")]
            LogError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io(err)
    }
}

impl From<std::str::Utf8Error> for LogError {
    fn from(err: std::str::Utf8Error) -> Self {
        LogError::Utf8(err)
    }
}

impl From<serde_json::Error> for LogError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return LogError::Io(err.into());
        }
        LogError::Parse(err)
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for LogError {
    fn from(err: csv::Error) -> Self {
        // An I/O failure underneath the CSV writer is still an I/O failure
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return LogError::Io(io_err);
            }
            return LogError::Export("CSV writer I/O failure".to_string());
        }
        LogError::Csv(err)
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
