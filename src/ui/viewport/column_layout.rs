use super::cell_label::CellLabeler;
use crate::data::dataset::DatasetHandle;
use crate::utils::text_width::{display_width, single_line};
use tracing::debug;

pub const DEFAULT_MIN_COLUMN_WIDTH: u16 = 6;
pub const DEFAULT_MAX_COLUMN_WIDTH: u16 = 40;
pub const DEFAULT_SAMPLE_ROWS: usize = 10;
/// Blank cells between two columns
pub const COLUMN_GAP: u16 = 1;
/// Values looked at when deciding whether a column is numeric
const TYPE_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSettings {
    pub min_width: u16,
    pub max_width: u16,
    /// Leading data rows measured per column
    pub sample_rows: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            max_width: DEFAULT_MAX_COLUMN_WIDTH,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

/// Column widths and offsets for one dataset handle
///
/// Measured once when a dataset is attached. Widths come from the formatted
/// header and the first few data rows, so a very wide value further down is
/// clipped rather than stretching the whole grid. Widths and offsets are in
/// terminal cells; offsets are `usize` like the row scroll offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    widths: Vec<u16>,
    starts: Vec<usize>,
    numeric: Vec<bool>,
}

impl ColumnLayout {
    pub fn measure(
        dataset: &DatasetHandle,
        labeler: &CellLabeler,
        settings: &LayoutSettings,
    ) -> Self {
        let column_count = dataset.column_count();
        let sample_count = settings.sample_rows.min(dataset.row_count());
        let samples: Vec<Vec<String>> = (0..sample_count)
            .filter_map(|row| dataset.store().get_row(row))
            .collect();

        let min_width = settings.min_width as usize;
        let max_width = (settings.max_width as usize).max(min_width);

        let mut widths = Vec::with_capacity(column_count);
        let mut numeric = Vec::with_capacity(column_count);
        for (col, header) in dataset.headers().iter().enumerate() {
            let values: Vec<&str> = samples
                .iter()
                .filter_map(|row| row.get(col).map(String::as_str))
                .collect();

            let header_width = display_width(&single_line(&labeler.header_label(header)));
            let data_width = values
                .iter()
                .map(|value| display_width(&single_line(value)))
                .max()
                .unwrap_or(0);
            let width = header_width
                .max(data_width)
                .clamp(min_width, max_width);

            widths.push(width as u16);
            numeric.push(is_numeric_column(&values));
        }

        let mut starts = Vec::with_capacity(widths.len());
        let mut x = 0usize;
        for &width in &widths {
            starts.push(x);
            x += width as usize + COLUMN_GAP as usize;
        }

        debug!(
            target: "viewport",
            "Measured {} columns from {} sample rows, total width {}",
            column_count,
            samples.len(),
            x.saturating_sub(COLUMN_GAP as usize)
        );
        Self {
            widths,
            starts,
            numeric,
        }
    }

    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    pub fn width(&self, col: usize) -> Option<u16> {
        self.widths.get(col).copied()
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub fn start(&self, col: usize) -> Option<usize> {
        self.starts.get(col).copied()
    }

    pub fn is_numeric(&self, col: usize) -> bool {
        self.numeric.get(col).copied().unwrap_or(false)
    }

    /// Width of the whole row, without a trailing gap
    pub fn total_width(&self) -> usize {
        match (self.starts.last(), self.widths.last()) {
            (Some(start), Some(width)) => start + *width as usize,
            _ => 0,
        }
    }

    /// Column under content x-coordinate `x`; the gap belongs to the column on its left
    pub fn column_at(&self, x: usize) -> Option<usize> {
        if x >= self.total_width() {
            return None;
        }
        match self.starts.binary_search(&x) {
            Ok(col) => Some(col),
            Err(insert_at) => insert_at.checked_sub(1),
        }
    }
}

/// More than half of the first non-empty values look like numbers
fn is_numeric_column(values: &[&str]) -> bool {
    let sample: Vec<&str> = values
        .iter()
        .copied()
        .filter(|value| !value.is_empty())
        .take(TYPE_SAMPLE_SIZE)
        .collect();
    let numeric = sample.iter().filter(|value| is_numeric_value(value)).count();
    !sample.is_empty() && numeric * 2 > sample.len()
}

/// Optional sign, digits, at most one dot, and thousands commas after a digit
pub fn is_numeric_value(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);

    let mut has_digit = false;
    let mut has_dot = false;
    for ch in digits.chars() {
        match ch {
            '0'..='9' => has_digit = true,
            '.' if !has_dot => has_dot = true,
            ',' if has_digit => {}
            _ => return false,
        }
    }
    has_digit
}
