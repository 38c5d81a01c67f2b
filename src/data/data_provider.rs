//! Data provider trait for random access into a loaded tabular resource
//!
//! The viewport never parses file bytes itself. Everything it knows about a
//! dataset comes through this narrow contract, so any store (CSV on disk,
//! in-memory rows, ...) can back the grid.

use std::fmt::Debug;

/// Core trait for read-only, random-access data
///
/// Implementations must answer every call quickly: the viewport calls
/// `get_row` on the UI thread each time a display slot is bound.
pub trait DataProvider: Send + Sync + Debug {
    /// Get a single row by index
    /// Returns None if the index is out of bounds or the row cannot be read
    fn get_row(&self, index: usize) -> Option<Vec<String>>;

    /// Get the column names/headers
    fn get_column_names(&self) -> Vec<String>;

    /// Get the total number of data rows (header excluded)
    fn get_row_count(&self) -> usize;

    /// Get the total number of columns
    fn get_column_count(&self) -> usize;

    /// Get a single cell value
    /// Returns None if row or column index is out of bounds
    fn get_cell_value(&self, row: usize, col: usize) -> Option<String> {
        self.get_row(row).and_then(|r| r.get(col).cloned())
    }

    /// Get a display-ready cell value
    /// Returns empty string if indices are out of bounds
    fn get_display_value(&self, row: usize, col: usize) -> String {
        self.get_cell_value(row, col).unwrap_or_default()
    }
}
