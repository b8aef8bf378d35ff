//! Input discovery and output naming
//!
//! Log files are recognised by name: `.json` or `.json.gz`, case-insensitive.

use crate::{LogError, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Recognised log file suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSuffix {
    /// `.json.gz`
    JsonGz,
    /// `.gz` without an inner `.json`
    Gz,
    /// `.json`
    Json,
    /// Anything else; only the last extension is stripped
    Other,
}

/// Split a file name into its stem and recognised suffix.
///
/// `run.json.gz` -> `("run", JsonGz)`, `run.json` -> `("run", Json)`,
/// `run.dat` -> `("run", Other)`.
pub fn strip_log_suffix(file_name: &str) -> (&str, LogSuffix) {
    let lower = file_name.to_ascii_lowercase();
    for (suffix, kind) in [
        (".json.gz", LogSuffix::JsonGz),
        (".gz", LogSuffix::Gz),
        (".json", LogSuffix::Json),
    ] {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return (&file_name[..file_name.len() - suffix.len()], kind);
        }
    }
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => (&file_name[..dot], LogSuffix::Other),
        _ => (file_name, LogSuffix::Other),
    }
}

/// True for names ending in `.json` or `.json.gz`
pub fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            matches!(
                strip_log_suffix(&name).1,
                LogSuffix::Json | LogSuffix::JsonGz
            )
        })
        .unwrap_or(false)
}

/// `file_name` inside `output_dir`, or next to `input_path` without one
pub fn output_path(input_path: &Path, output_dir: Option<&Path>, file_name: &str) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name),
    }
}

/// Log files directly inside `dir` (not recursive), sorted by name
pub fn find_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LogError::InvalidArgument(format!(
            "{} is not a valid directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_log_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "log files found");
    Ok(files)
}

/// Expand command-line inputs into log files.
///
/// Plain paths are taken as given, glob patterns are expanded, and
/// directories contribute their log files.
pub fn expand_inputs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if input.contains('*') || input.contains('?') || input.contains('[') {
            let pattern = glob(input).map_err(|e| {
                LogError::InvalidArgument(format!("invalid glob pattern '{input}': {e}"))
            })?;
            let mut matched = 0;
            for entry in pattern {
                match entry {
                    Ok(path) if is_log_file(&path) => {
                        files.push(path);
                        matched += 1;
                    }
                    Ok(path) => debug!(path = %path.display(), "skipping non-log match"),
                    Err(e) => warn!("cannot read glob match for '{input}': {e}"),
                }
            }
            debug!(pattern = input, matched, "glob expanded");
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            files.extend(find_log_files(&path)?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}
