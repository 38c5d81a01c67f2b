use crate::data::data_provider::DataProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Shape of one successfully loaded tabular resource
///
/// Counts and headers are captured once when the handle is created and never
/// change afterwards. Loading another file (or reloading the same one) yields
/// a new handle with a larger `generation`, which is how stale work built on
/// an older handle is recognised.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    generation: u64,
    name: Option<String>,
    row_count: usize,
    column_count: usize,
    headers: Arc<[String]>,
    store: Arc<dyn DataProvider>,
}

impl DatasetHandle {
    pub fn new(store: Arc<dyn DataProvider>) -> Self {
        let headers: Arc<[String]> = store.get_column_names().into();
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            name: None,
            row_count: store.get_row_count(),
            column_count: headers.len(),
            headers,
            store,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn store(&self) -> &dyn DataProvider {
        self.store.as_ref()
    }
}
