use crate::data::dataset::DatasetHandle;

/// Names longer than this are shortened in the info line
const MAX_NAME_CHARS: usize = 15;
const SHORT_NAME_CHARS: usize = 12;

pub const NO_FILE_LOADED: &str = "No file loaded";

/// Compact one-line summary such as `sales.csv • 120 rows • 4 columns`
pub fn file_info(dataset: Option<&DatasetHandle>) -> String {
    match dataset {
        Some(dataset) => {
            format_file_info(dataset.name(), dataset.row_count(), dataset.column_count())
        }
        None => NO_FILE_LOADED.to_string(),
    }
}

pub fn format_file_info(name: Option<&str>, rows: usize, columns: usize) -> String {
    match name.filter(|name| !name.is_empty()) {
        Some(name) => format!(
            "{} • {} rows • {} columns",
            shorten_name(name),
            rows,
            columns
        ),
        None => format!("{} rows • {} columns", rows, columns),
    }
}

pub fn shorten_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_CHARS {
        let mut short: String = name.chars().take(SHORT_NAME_CHARS).collect();
        short.push_str("...");
        short
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory_store::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_info_with_name() {
        assert_eq!(
            format_file_info(Some("sales.csv"), 120, 4),
            "sales.csv • 120 rows • 4 columns"
        );
    }

    #[test]
    fn test_info_without_name() {
        assert_eq!(format_file_info(None, 0, 2), "0 rows • 2 columns");
        assert_eq!(format_file_info(Some(""), 3, 1), "3 rows • 1 columns");
    }

    #[test]
    fn test_long_names_are_shortened() {
        assert_eq!(shorten_name("exactly_15_char"), "exactly_15_char");
        assert_eq!(shorten_name("quarterly_report_2024.csv"), "quarterly_re...");
    }

    #[test]
    fn test_info_from_dataset() {
        let store = MemoryStore::new(["a", "b", "c"]).with_rows([["1", "2", "3"]]);
        let dataset = DatasetHandle::new(Arc::new(store)).with_name("tiny.csv");

        assert_eq!(file_info(Some(&dataset)), "tiny.csv • 1 rows • 3 columns");
        assert_eq!(file_info(None), "No file loaded");
    }
}
