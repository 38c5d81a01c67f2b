//! Indexed CSV store
//!
//! Loading scans the file once, keeping the header row and the byte position
//! of every record. Rows are then read on demand by seeking straight to the
//! record, so memory stays proportional to the row count rather than the
//! file size and any row can be fetched without re-reading its predecessors.

use crate::data::data_provider::DataProvider;
use anyhow::{anyhow, Result};
use csv::{Position, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Parsing options handed to the `csv` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub trim_whitespace: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim_whitespace: true,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(if self.trim_whitespace {
                Trim::All
            } else {
                Trim::None
            });
        builder
    }
}

#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    headers: Vec<String>,
    positions: Vec<Position>,
    reader: Mutex<csv::Reader<File>>,
}

impl CsvStore {
    /// Parse the header row and index every record of the file at `path`
    pub fn load<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        info!(target: "store", "Loading {}", path.display());

        let mut reader = options
            .builder()
            .from_path(path)
            .map_err(|e| anyhow!("Cannot open {}: {}", path.display(), e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| anyhow!("Cannot read header row of {}: {}", path.display(), e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            warn!(target: "store", "{} has no header row", path.display());
            return Err(anyhow!("No data found in {}", path.display()));
        }

        let mut positions = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let position = reader.position().clone();
            let more = reader
                .read_record(&mut record)
                .map_err(|e| anyhow!("Malformed record in {}: {}", path.display(), e))?;
            if !more {
                break;
            }
            positions.push(position);
        }

        info!(
            target: "store",
            "Indexed {}: {} rows, {} columns",
            path.display(),
            positions.len(),
            headers.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            positions,
            reader: Mutex::new(reader),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_at(&self, position: &Position) -> Option<Vec<String>> {
        let mut reader = self.reader.lock().unwrap_or_else(|poisoned| {
            warn!(target: "store", "Reader lock was poisoned, recovering");
            self.reader.clear_poison();
            PoisonError::into_inner(poisoned)
        });
        if let Err(e) = reader.seek(position.clone()) {
            warn!(target: "store", "Seek to byte {} failed: {}", position.byte(), e);
            return None;
        }

        let mut record = StringRecord::new();
        match reader.read_record(&mut record) {
            Ok(true) => Some(record.iter().map(|field| field.to_string()).collect()),
            Ok(false) => None,
            Err(e) => {
                warn!(target: "store", "Read at byte {} failed: {}", position.byte(), e);
                None
            }
        }
    }
}

impl DataProvider for CsvStore {
    fn get_row(&self, index: usize) -> Option<Vec<String>> {
        let Some(position) = self.positions.get(index) else {
            debug!(target: "store", "Row {} requested, {} available", index, self.positions.len());
            return None;
        };
        self.read_at(position)
    }

    fn get_column_names(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn get_row_count(&self) -> usize {
        self.positions.len()
    }

    fn get_column_count(&self) -> usize {
        self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_indexes_rows() {
        let file = write_csv("id,name,city\n1,Alice,Oslo\n2,Bob,Bergen\n3,Carol,Tromsø\n");
        let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();

        assert_eq!(store.get_row_count(), 3);
        assert_eq!(store.get_column_count(), 3);
        assert_eq!(store.get_column_names(), vec!["id", "name", "city"]);
        assert_eq!(store.get_row(2).unwrap(), vec!["3", "Carol", "Tromsø"]);
        assert_eq!(store.get_row(0).unwrap(), vec!["1", "Alice", "Oslo"]);
        assert!(store.get_row(3).is_none());
    }

    #[test]
    fn test_quoted_fields_and_embedded_newlines() {
        let file = write_csv("a,b\n\"x, y\",\"line1\nline2\"\n\"say \"\"hi\"\"\",z\n");
        let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();

        assert_eq!(store.get_row_count(), 2);
        assert_eq!(store.get_row(0).unwrap(), vec!["x, y", "line1\nline2"]);
        assert_eq!(store.get_row(1).unwrap(), vec!["say \"hi\"", "z"]);
    }

    #[test]
    fn test_rows_readable_after_poisoned_lock() {
        let file = write_csv("a\n1\n2\n");
        let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
        let store = std::sync::Arc::new(store);

        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.reader.lock().unwrap();
            panic!("reader thread failed while holding the lock");
        })
        .join();
        assert!(store.reader.is_poisoned());

        assert_eq!(store.get_row(1).unwrap(), vec!["2"]);
        assert_eq!(store.get_row(0).unwrap(), vec!["1"]);
        assert!(!store.reader.is_poisoned());
    }

    #[test]
    fn test_trim_whitespace_option() {
        let file = write_csv(" a , b \n  1 ,  2  \n");

        let trimmed = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
        assert_eq!(trimmed.get_column_names(), vec!["a", "b"]);
        assert_eq!(trimmed.get_row(0).unwrap(), vec!["1", "2"]);

        let raw = CsvStore::load(
            file.path(),
            &CsvOptions::default().with_trim_whitespace(false),
        )
        .unwrap();
        assert_eq!(raw.get_column_names(), vec![" a ", " b "]);
        assert_eq!(raw.get_row(0).unwrap(), vec!["  1 ", "  2  "]);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let file = write_csv("a,b,c\n1,2\n1,2,3,4\n");
        let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();

        assert_eq!(store.get_row(0).unwrap(), vec!["1", "2"]);
        assert_eq!(store.get_row(1).unwrap(), vec!["1", "2", "3", "4"]);
        assert_eq!(store.get_display_value(0, 2), "");
    }

    #[test]
    fn test_custom_delimiter() {
        let file = write_csv("a;b\n1;2\n");
        let store =
            CsvStore::load(file.path(), &CsvOptions::default().with_delimiter(b';')).unwrap();

        assert_eq!(store.get_column_count(), 2);
        assert_eq!(store.get_cell_value(0, 1), Some("2".to_string()));
    }

    #[test]
    fn test_empty_file_is_a_load_failure() {
        let file = write_csv("");
        let err = CsvStore::load(file.path(), &CsvOptions::default()).unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }

    #[test]
    fn test_missing_file_is_a_load_failure() {
        let err = CsvStore::load("/definitely/not/here.csv", &CsvOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Cannot open"));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let file = write_csv("A,B\n");
        let store = CsvStore::load(file.path(), &CsvOptions::default()).unwrap();
        assert_eq!(store.get_row_count(), 0);
        assert_eq!(store.get_column_names(), vec!["A", "B"]);
    }
}
