use serde_json::Value;

pub const NOISE_KEY: &str = "noise";
pub const XTALK_KEY: &str = "xtalk";
pub const PEAKS_KEY: &str = "peaks";

/// One pixel's result record.
///
/// Every field is optional and checked on its own; nothing is assumed to
/// co-occur.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    value: &'a Value,
}

impl<'a> CellView<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn noise(&self) -> Option<&'a Value> {
        self.value.get(NOISE_KEY)
    }

    pub fn xtalk(&self) -> Option<&'a Value> {
        self.value.get(XTALK_KEY)
    }

    pub fn peaks(&self) -> impl Iterator<Item = PeakView<'a>> + 'a {
        self.value
            .get(PEAKS_KEY)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(PeakView::new)
    }
}

/// One detected return within a cell
#[derive(Debug, Clone, Copy)]
pub struct PeakView<'a> {
    value: &'a Value,
}

impl<'a> PeakView<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn distance(&self) -> Option<&'a Value> {
        self.value.get("distance")
    }

    pub fn snr(&self) -> Option<&'a Value> {
        self.value.get("snr")
    }

    pub fn signal(&self) -> Option<&'a Value> {
        self.value.get("signal")
    }
}
