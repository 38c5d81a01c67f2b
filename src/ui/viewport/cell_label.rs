/// Header labels longer than this are shortened
pub const DEFAULT_HEADER_MAX_CHARS: usize = 12;
/// Characters kept from the part before the first separator
pub const DEFAULT_FIRST_PART_CHARS: usize = 8;

const SEPARATORS: [char; 2] = ['_', ' '];

/// Turns header names and cell values into display strings
///
/// Long header names are shortened so that both sides of the first
/// separator stay recognisable: `transaction_amount` becomes `transact_amo`
/// where a flat cut would give `transaction_`. Data values are shown as they
/// are. Lengths are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLabeler {
    max_chars: usize,
    first_part_chars: usize,
}

impl Default for CellLabeler {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_HEADER_MAX_CHARS,
            first_part_chars: DEFAULT_FIRST_PART_CHARS,
        }
    }
}

impl CellLabeler {
    /// `first_part_chars` is capped below `max_chars` so a split label never
    /// exceeds the threshold
    pub fn new(max_chars: usize, first_part_chars: usize) -> Self {
        Self {
            max_chars,
            first_part_chars: first_part_chars.min(max_chars.saturating_sub(1)),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn header_label(&self, header: &str) -> String {
        if header.chars().count() <= self.max_chars {
            return header.to_string();
        }

        SEPARATORS
            .iter()
            .find_map(|&separator| self.split_label(header, separator))
            .unwrap_or_else(|| header.chars().take(self.max_chars).collect())
    }

    /// Absent values render as the empty string
    pub fn data_label(&self, value: Option<&str>) -> String {
        value.unwrap_or_default().to_string()
    }

    fn split_label(&self, header: &str, separator: char) -> Option<String> {
        let (first, rest) = header.split_once(separator)?;
        if rest.is_empty() || self.first_part_chars == 0 {
            return None;
        }

        let mut label: String = first.chars().take(self.first_part_chars).collect();
        let rest_budget = self
            .max_chars
            .saturating_sub(label.chars().count() + 1);
        label.push(separator);
        label.extend(rest.chars().take(rest_budget));
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_headers_unchanged() {
        let labeler = CellLabeler::default();
        assert_eq!(labeler.header_label(""), "");
        assert_eq!(labeler.header_label("id"), "id");
        assert_eq!(labeler.header_label("exactly_12ch"), "exactly_12ch");
    }

    #[test]
    fn test_underscore_split() {
        let labeler = CellLabeler::default();
        assert_eq!(labeler.header_label("customer_identification"), "customer_ide");
        assert_eq!(labeler.header_label("id_of_the_customer"), "id_of_the_cu");
        assert_eq!(labeler.header_label("transaction_amount"), "transact_amo");
    }

    #[test]
    fn test_space_split() {
        let labeler = CellLabeler::default();
        assert_eq!(labeler.header_label("order date of purchase"), "order date o");
    }

    #[test]
    fn test_underscore_wins_over_space() {
        let labeler = CellLabeler::default();
        assert_eq!(
            labeler.header_label("customer identification_number"),
            "customer_num"
        );
    }

    #[test]
    fn test_flat_truncation_without_separator() {
        let labeler = CellLabeler::default();
        let header = "abcdefghijklmnopqrst";
        assert_eq!(header.len(), 20);
        assert_eq!(labeler.header_label(header), "abcdefghijkl");
    }

    #[test]
    fn test_trailing_separator_falls_back() {
        let labeler = CellLabeler::default();
        assert_eq!(labeler.header_label("averyveryverylongname_"), "averyveryver");
        // Underscore split is empty, the space split is usable.
        assert_eq!(labeler.header_label("total amount_"), "total amount");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let labeler = CellLabeler::default();
        assert_eq!(labeler.header_label("måned_omsetning_total"), "måned_omsetn");
        assert_eq!(labeler.header_label("ååååå"), "ååååå");
    }

    #[test]
    fn test_deterministic() {
        let labeler = CellLabeler::default();
        let first = labeler.header_label("customer_identification");
        let second = labeler.header_label("customer_identification");
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_budget() {
        let labeler = CellLabeler::new(8, 3);
        assert_eq!(labeler.header_label("customer_identification"), "cus_iden");
        assert_eq!(labeler.header_label("shortish"), "shortish");
    }

    #[test]
    fn test_first_part_is_capped_by_threshold() {
        let labeler = CellLabeler::new(5, 8);
        let label = labeler.header_label("customer_identification");
        assert_eq!(label, "cust_");
        assert!(label.chars().count() <= labeler.max_chars());

        // No room for a first part: fall back to a flat cut.
        let labeler = CellLabeler::new(1, 8);
        assert_eq!(labeler.header_label("customer_identification"), "c");
    }

    #[test]
    fn test_data_labels_pass_through() {
        let labeler = CellLabeler::default();
        assert_eq!(
            labeler.data_label(Some("a very long cell value indeed")),
            "a very long cell value indeed"
        );
        assert_eq!(labeler.data_label(Some("")), "");
        assert_eq!(labeler.data_label(None), "");
    }
}
