use crate::data::data_provider::DataProvider;

/// Rows held entirely in memory
///
/// Used for small generated datasets and as the reference store in tests.
/// `claimed_rows` lets a store report more rows than it can return, which is
/// how a truncated or concurrently rewritten file looks from the viewport.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    claimed_rows: Option<usize>,
}

impl MemoryStore {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            claimed_rows: None,
        }
    }

    pub fn with_rows<S: Into<String>>(
        mut self,
        rows: impl IntoIterator<Item = impl IntoIterator<Item = S>>,
    ) -> Self {
        for row in rows {
            self.push_row(row);
        }
        self
    }

    /// Report `count` rows regardless of how many are actually stored
    pub fn with_claimed_rows(mut self, count: usize) -> Self {
        self.claimed_rows = Some(count);
        self
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

impl DataProvider for MemoryStore {
    fn get_row(&self, index: usize) -> Option<Vec<String>> {
        self.rows.get(index).cloned()
    }

    fn get_column_names(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn get_row_count(&self) -> usize {
        self.claimed_rows.unwrap_or(self.rows.len())
    }

    fn get_column_count(&self) -> usize {
        self.headers.len()
    }
}
