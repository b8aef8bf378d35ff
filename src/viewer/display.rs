//! Display rules for the viewer page
//!
//! The page script renders one frame at a time in the browser. Everything it
//! decides with (thresholds, class names, colours, initial control state)
//! comes from here through the embedded payload.

use crate::types::{FrameView, HistogramView};
use serde::Serialize;
use serde_json::{Map, Value};

/// SNR strictly above this is high confidence
pub const HIGH_CONFIDENCE_SNR: f64 = 20.0;
/// SNR strictly above this (and not high) is medium confidence
pub const MEDIUM_CONFIDENCE_SNR: f64 = 10.0;
/// Upper bound of the peak-count selector
pub const MAX_DISPLAYED_PEAKS: usize = 4;
/// Width peak values are right-aligned to
pub const PEAK_FIELD_WIDTH: usize = 7;
/// Class of peaks with no confidence band
pub const NO_CONFIDENCE_CLASS: &str = "peak-none";

/// Colour band of a peak, from its signal-to-noise ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakConfidence {
    High,
    Medium,
    Low,
}

impl PeakConfidence {
    /// `None` for SNR at or below zero (and NaN): the peak stays uncoloured
    pub fn classify(snr: f64) -> Option<Self> {
        if snr > HIGH_CONFIDENCE_SNR {
            Some(PeakConfidence::High)
        } else if snr > MEDIUM_CONFIDENCE_SNR {
            Some(PeakConfidence::Medium)
        } else if snr > 0.0 {
            Some(PeakConfidence::Low)
        } else {
            None
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PeakConfidence::High => "peak-high",
            PeakConfidence::Medium => "peak-medium",
            PeakConfidence::Low => "peak-low",
        }
    }
}

/// Which histogram data a frame can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramKind {
    /// Per-pixel `mp_histo[row][col]`
    Mp,
    /// Per-row `ref_histo[row]`
    Ref,
}

impl HistogramKind {
    pub fn color(&self) -> &'static str {
        match self {
            HistogramKind::Mp => "#4CAF50",
            HistogramKind::Ref => "#2196F3",
        }
    }
}

/// CSS class per confidence band, read by the page script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceClasses {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub none: &'static str,
}

impl Default for ConfidenceClasses {
    fn default() -> Self {
        Self {
            high: PeakConfidence::High.css_class(),
            medium: PeakConfidence::Medium.css_class(),
            low: PeakConfidence::Low.css_class(),
            none: NO_CONFIDENCE_CLASS,
        }
    }
}

/// Bar colour per histogram kind, keyed like [`HistogramKind`] serializes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramColors {
    pub mp: &'static str,
    #[serde(rename = "ref")]
    pub reference: &'static str,
}

impl Default for HistogramColors {
    fn default() -> Self {
        Self {
            mp: HistogramKind::Mp.color(),
            reference: HistogramKind::Ref.color(),
        }
    }
}

/// Histogram data the frame offers: `mp_histo` when any cell has a non-empty
/// `bin`, otherwise `ref_histo` when any row record has one, otherwise none.
pub fn histogram_availability(frame: &FrameView<'_>) -> Option<HistogramKind> {
    let has_mp = frame
        .mp_histo()
        .map(|grid| grid.histograms().any(|h| h.has_bins()))
        .unwrap_or(false);
    if has_mp {
        return Some(HistogramKind::Mp);
    }

    let has_ref = frame
        .ref_histo()
        .map(|rows| rows.iter().map(HistogramView::new).any(|h| h.has_bins()))
        .unwrap_or(false);
    if has_ref {
        return Some(HistogramKind::Ref);
    }
    None
}

/// Initial state of the page controls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_noise: bool,
    pub show_xtalk: bool,
    pub show_peaks: bool,
    pub show_distance: bool,
    pub show_snr: bool,
    pub show_signal: bool,
    pub show_xyz: bool,
    pub show_histogram: bool,
    pub histo_type: HistogramKind,
    pub peaks_to_show: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_noise: false,
            show_xtalk: false,
            show_peaks: true,
            show_distance: true,
            show_snr: true,
            show_signal: false,
            show_xyz: false,
            show_histogram: false,
            histo_type: HistogramKind::Mp,
            peaks_to_show: MAX_DISPLAYED_PEAKS,
        }
    }
}

impl DisplayOptions {
    /// Defaults, with the peak count taken from `configuration.nr_peaks`
    pub fn for_configuration(configuration: Option<&Map<String, Value>>) -> Self {
        Self {
            peaks_to_show: initial_peak_count(configuration),
            ..Self::default()
        }
    }
}

/// `nr_peaks` clamped to `1..=4`; missing or zero means all four
pub fn initial_peak_count(configuration: Option<&Map<String, Value>>) -> usize {
    configuration
        .and_then(|c| c.get("nr_peaks"))
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .map(|n| (n as usize).min(MAX_DISPLAYED_PEAKS))
        .unwrap_or(MAX_DISPLAYED_PEAKS)
}
