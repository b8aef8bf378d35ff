//! Splitting a log into parts by frame count
//!
//! Each part is a full log document: every top-level key of the source is
//! carried over unchanged and `Result_Set` holds one contiguous chunk of
//! frames. Parts keep the compressed or plain form of the input.

use crate::loader::{load_log, save_log, Compression};
use crate::types::MeasurementLog;
use crate::{LogError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_FRAMES_PER_FILE: usize = 50;

/// Splitter options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Frames per part, must be positive
    pub frames_per_file: usize,
    /// Where parts are written; the input's directory when `None`
    pub output_dir: Option<PathBuf>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            frames_per_file: DEFAULT_FRAMES_PER_FILE,
            output_dir: None,
        }
    }
}

/// Frame range `[start, end)` of one part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlan {
    /// 1-based part number
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl PartPlan {
    pub fn frame_count(&self) -> usize {
        self.end - self.start
    }
}

/// A written part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartReport {
    pub plan: PartPlan,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// `info.frame_number` of the first and last frame, when recorded
    pub first_frame_number: Option<u64>,
    pub last_frame_number: Option<u64>,
}

/// Outcome of splitting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub input: PathBuf,
    pub original_size: u64,
    pub total_frames: usize,
    pub frames_per_file: usize,
    pub parts: Vec<PartReport>,
}

impl SplitReport {
    pub fn total_output_size(&self) -> u64 {
        self.parts.iter().map(|p| p.size_bytes).sum()
    }
}

/// Size in MiB, as shown in status output
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Partition `total_frames` into chunks of `frames_per_file`.
///
/// Yields `ceil(total / frames_per_file)` plans; only the last may be short.
pub fn plan_parts(total_frames: usize, frames_per_file: usize) -> Result<Vec<PartPlan>> {
    if frames_per_file == 0 {
        return Err(LogError::InvalidArgument(
            "frames per file must be positive".to_string(),
        ));
    }

    Ok((0..total_frames)
        .step_by(frames_per_file)
        .enumerate()
        .map(|(i, start)| PartPlan {
            index: i + 1,
            start,
            end: (start + frames_per_file).min(total_frames),
        })
        .collect())
}

/// Split `log` in memory, one document per planned part
pub fn split_log(log: &MeasurementLog, frames_per_file: usize) -> Result<Vec<MeasurementLog>> {
    let frames = log.result_set();
    Ok(plan_parts(frames.len(), frames_per_file)?
        .into_iter()
        .map(|plan| log.with_result_set(frames[plan.start..plan.end].to_vec()))
        .collect())
}

/// `{stem}_part{index}{ext}`: `stem` drops only the last extension of
/// `input_name`, `ext` follows the compression of the input
pub fn part_file_name(input_name: &str, index: usize, compression: Compression) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_part{index}{}", compression.part_extension())
}

fn frame_number_at(log: &MeasurementLog, index: usize) -> Option<u64> {
    log.frame(index)
        .and_then(|frame| frame.info())
        .and_then(|info| info.frame_number())
}

/// Load `input`, split it and write every part
pub fn split_file(input: &Path, options: &SplitOptions) -> Result<SplitReport> {
    if options.frames_per_file == 0 {
        return Err(LogError::InvalidArgument(
            "frames per file must be positive".to_string(),
        ));
    }

    let compression = Compression::from_path(input);
    let log = load_log(input)?;
    let original_size = std::fs::metadata(input)?.len();

    let output_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    if !output_dir.as_os_str().is_empty() && !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)?;
        debug!(dir = %output_dir.display(), "created output directory");
    }

    let input_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let frames = log.result_set();
    let plans = plan_parts(frames.len(), options.frames_per_file)?;
    debug!(
        total_frames = frames.len(),
        parts = plans.len(),
        ?compression,
        "split planned"
    );

    let mut parts = Vec::with_capacity(plans.len());
    for plan in plans {
        let part = log.with_result_set(frames[plan.start..plan.end].to_vec());
        let path = output_dir.join(part_file_name(&input_name, plan.index, compression));
        let size_bytes = save_log(&path, &part, compression)?;

        parts.push(PartReport {
            plan,
            path,
            size_bytes,
            first_frame_number: frame_number_at(&log, plan.start),
            last_frame_number: frame_number_at(&log, plan.end.saturating_sub(1)),
        });
    }

    info!(input = %input.display(), parts = parts.len(), "split complete");
    Ok(SplitReport {
        input: input.to_path_buf(),
        original_size,
        total_frames: frames.len(),
        frames_per_file: options.frames_per_file,
        parts,
    })
}
