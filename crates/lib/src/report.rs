//! # Report Tables
//!
//! The two tabular result sets accumulated across all campaigns, plus the
//! fixed-precision metric formatting applied at append time.

/// Column headers for the category-label sheet.
pub const CATEGORY_HEADER: [&str; 6] = [
    "Campaign Name",
    "Category Label",
    "Conv Val",
    "Conv",
    "Clicks",
    "Imp",
];

/// Column headers for the search-term sheet.
pub const TERM_HEADER: [&str; 9] = [
    "Campaign Name",
    "Category Label",
    "Subcat",
    "Search Term",
    "Conv Val",
    "Conv",
    "Clicks",
    "Imp",
    "Exists as Keyword?",
];

/// An ordered sequence of rows under a fixed header.
#[derive(Debug, Clone)]
pub struct ReportTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends one data row. The row must match the header width.
    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    /// Number of data rows, excluding the header.
    pub fn data_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether anything beyond the header has been accumulated.
    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// The full table as written to a sheet: header first, then data rows.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.clone());
        values.extend(self.rows.iter().cloned());
        values
    }
}

/// Renders a conversion value with exactly two decimal digits.
pub fn format_conversions_value(value: f64) -> String {
    format!("{value:.2}")
}

/// Renders a conversions count with exactly one decimal digit.
pub fn format_conversions(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_with_fixed_precision() {
        assert_eq!(format_conversions_value(3.0), "3.00");
        assert_eq!(format_conversions_value(42.499), "42.50");
        assert_eq!(format_conversions_value(0.0), "0.00");
        assert_eq!(format_conversions(3.0), "3.0");
        assert_eq!(format_conversions(12.25), "12.2");
        assert_eq!(format_conversions(1234.0), "1234.0");
    }

    #[test]
    fn header_only_table_has_no_data() {
        let table = ReportTable::new(&CATEGORY_HEADER);
        assert!(!table.has_data());
        assert_eq!(table.data_rows(), 0);
        assert_eq!(table.to_values().len(), 1);
        assert_eq!(table.to_values()[0][0], "Campaign Name");
    }

    #[test]
    fn values_keep_insertion_order_behind_the_header() {
        let mut table = ReportTable::new(&["a", "b"]);
        table.push(vec!["1".into(), "2".into()]);
        table.push(vec!["3".into(), "4".into()]);
        let values = table.to_values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], vec!["1", "2"]);
        assert_eq!(values[2], vec!["3", "4"]);
    }
}
