use crate::types::CellView;
use serde_json::{Map, Value};

pub const RESULTS_KEY: &str = "results";
pub const MP_HISTO_KEY: &str = "mp_histo";
pub const REF_HISTO_KEY: &str = "ref_histo";
pub const FRAME_INFO_KEY: &str = "info";
pub const BIN_KEY: &str = "bin";

/// One measurement cycle, addressed by its zero-based position in `Result_Set`
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    index: usize,
    value: &'a Value,
}

impl<'a> FrameView<'a> {
    pub fn new(index: usize, value: &'a Value) -> Self {
        Self { index, value }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> Option<FrameInfo<'a>> {
        self.value
            .get(FRAME_INFO_KEY)
            .and_then(Value::as_object)
            .map(FrameInfo::new)
    }

    /// Results grid, if the frame carries the `results` key at all.
    ///
    /// A `results` value that is not a list of rows is seen as an empty grid.
    pub fn results(&self) -> Option<Grid<'a>> {
        self.value.get(RESULTS_KEY).map(Grid::from_value)
    }

    /// Per-pixel histograms laid out like `results`
    pub fn mp_histo(&self) -> Option<Grid<'a>> {
        self.value.get(MP_HISTO_KEY).map(Grid::from_value)
    }

    /// Per-row reference histograms
    pub fn ref_histo(&self) -> Option<&'a [Value]> {
        self.value
            .get(REF_HISTO_KEY)
            .map(|v| v.as_array().map(Vec::as_slice).unwrap_or(&[]))
    }

    /// `(columns, rows)` of the results grid, taken from its first row
    pub fn resolution(&self) -> Option<(usize, usize)> {
        let grid = self.results()?;
        if grid.row_count() == 0 {
            return None;
        }
        Some((grid.column_count(), grid.row_count()))
    }
}

/// Row-major 2-D grid of JSON records (`results` or `mp_histo`)
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    rows: &'a [Value],
}

impl<'a> Grid<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        Self {
            rows: value.as_array().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; later rows are trusted to match
    pub fn column_count(&self) -> usize {
        self.row(0).map(<[Value]>::len).unwrap_or(0)
    }

    pub fn row(&self, row: usize) -> Option<&'a [Value]> {
        self.rows
            .get(row)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&'a Value> {
        self.row(row)?.get(col)
    }

    /// `grid[0][0]`, the record the CSV header is derived from
    pub fn first(&self) -> Option<&'a Value> {
        self.get(0, 0)
    }

    /// All records, row by row. Rows that are not lists contribute nothing.
    pub fn iter_row_major(&self) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .filter_map(Value::as_array)
            .flat_map(|row| row.iter())
    }

    pub fn cells(&self) -> impl Iterator<Item = CellView<'a>> + 'a {
        self.iter_row_major().map(CellView::new)
    }

    pub fn histograms(&self) -> impl Iterator<Item = HistogramView<'a>> + 'a {
        self.iter_row_major().map(HistogramView::new)
    }

    pub fn len(&self) -> usize {
        self.iter_row_major().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One histogram record: `{"bin": [count, ...]}`
#[derive(Debug, Clone, Copy)]
pub struct HistogramView<'a> {
    value: &'a Value,
}

impl<'a> HistogramView<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Bin counts, when `bin` is present and is a list
    pub fn bins(&self) -> Option<&'a [Value]> {
        self.value
            .get(BIN_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn has_bins(&self) -> bool {
        self.bins().map(|bins| !bins.is_empty()).unwrap_or(false)
    }
}

/// Per-frame metadata written by the logger
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FrameInfo<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn frame_number(&self) -> Option<u64> {
        self.fields.get("frame_number").and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_by_three() -> Value {
        json!({
            "info": {"frame_number": 7, "warnings": 1, "systick_t0": 1234},
            "results": [
                [{"noise": 1}, {"noise": 2}, {"noise": 3}],
                [{"noise": 4}, {"noise": 5}, {"noise": 6}]
            ],
            "mp_histo": [
                [{"bin": [1, 2]}, {"bin": []}, {"bin": [3]}],
                [{"bin": [4]}, {"bin": [5]}, {"bin": [6]}]
            ],
            "ref_histo": [{"bin": [10, 11]}, {"bin": [12]}]
        })
    }

    #[test]
    fn test_grid_dimensions_and_order() {
        let value = two_by_three();
        let frame = FrameView::new(0, &value);
        let results = frame.results().unwrap();
        assert_eq!(results.row_count(), 2);
        assert_eq!(results.column_count(), 3);
        assert_eq!(results.len(), 6);
        assert_eq!(frame.resolution(), Some((3, 2)));

        let noise: Vec<i64> = results
            .cells()
            .map(|c| c.noise().and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(noise, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_histogram_layouts() {
        let value = two_by_three();
        let frame = FrameView::new(0, &value);

        let mp = frame.mp_histo().unwrap();
        assert_eq!(mp.len(), 6);
        assert_eq!(HistogramView::new(mp.get(1, 2).unwrap()).bins().unwrap(), &[json!(6)]);
        assert!(!HistogramView::new(mp.get(0, 1).unwrap()).has_bins());

        // One reference record per row, not per cell
        let ref_rows = frame.ref_histo().unwrap();
        assert_eq!(ref_rows.len(), 2);
        assert_eq!(HistogramView::new(&ref_rows[0]).bins().unwrap().len(), 2);
    }

    #[test]
    fn test_frame_number() {
        let value = two_by_three();
        let info = FrameView::new(0, &value).info().unwrap();
        assert_eq!(info.frame_number(), Some(7));

        let value = json!({"info": {"frame_number": "7"}});
        assert!(FrameView::new(0, &value).info().unwrap().frame_number().is_none());
    }

    #[test]
    fn test_absent_sections() {
        let value = json!({"info": {}});
        let frame = FrameView::new(3, &value);
        assert_eq!(frame.index(), 3);
        assert!(frame.results().is_none());
        assert!(frame.mp_histo().is_none());
        assert!(frame.ref_histo().is_none());
        assert!(frame.resolution().is_none());
    }

    #[test]
    fn test_malformed_results_is_empty_grid() {
        let value = json!({"results": null});
        let grid = FrameView::new(0, &value).results().unwrap();
        assert!(grid.is_empty());
        assert!(grid.first().is_none());
    }
}
