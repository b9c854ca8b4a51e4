//! # GAQL Construction
//!
//! A small builder for Google Ads Query Language text. Filters are composed
//! as named clauses and string literals are escaped on the way in, so
//! interpolated identifiers (campaign ids, insight ids) cannot break out of
//! their quotes.

use crate::types::DateRange;

/// Builder for a single GAQL `SELECT` statement.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    select: Vec<String>,
    from: String,
    filters: Vec<String>,
    order_by: Option<String>,
}

impl QueryBuilder {
    /// Starts a query against `resource`.
    pub fn new(resource: &str) -> Self {
        Self {
            from: resource.to_string(),
            ..Self::default()
        }
    }

    /// Adds columns to the select list, in order.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Adds `field = 'value'`, with the literal escaped.
    pub fn filter_eq(mut self, field: &str, value: &str) -> Self {
        self.filters.push(format!("{field} = {}", quote(value)));
        self
    }

    /// Adds `field != 'value'`, with the literal escaped.
    pub fn filter_neq(mut self, field: &str, value: &str) -> Self {
        self.filters.push(format!("{field} != {}", quote(value)));
        self
    }

    /// Adds `field > value` for a numeric bound.
    pub fn filter_gt(mut self, field: &str, value: i64) -> Self {
        self.filters.push(format!("{field} > {value}"));
        self
    }

    /// Adds `field >= value` for a numeric bound.
    pub fn filter_gte(mut self, field: &str, value: i64) -> Self {
        self.filters.push(format!("{field} >= {value}"));
        self
    }

    /// Adds `field BETWEEN start AND end` over the 8-digit interval bounds.
    pub fn filter_date_between(mut self, field: &str, range: &DateRange) -> Self {
        let (start, end) = range.bounds();
        self.filters.push(format!("{field} BETWEEN {start} AND {end}"));
        self
    }

    /// Orders the result set by `field`, descending.
    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by = Some(format!("{field} DESC"));
        self
    }

    /// Renders the final query text.
    pub fn build(self) -> String {
        let mut query = format!("SELECT {} FROM {}", self.select.join(", "), self.from);
        if !self.filters.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.filters.join(" AND "));
        }
        if let Some(order) = self.order_by {
            query.push_str(" ORDER BY ");
            query.push_str(&order);
        }
        query
    }
}

/// Single-quotes a string literal, escaping backslashes and embedded quotes.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn march() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    #[test]
    fn composes_filters_and_ordering() {
        let query = QueryBuilder::new("campaign")
            .select(&["campaign.id", "campaign.name"])
            .filter_neq("campaign.status", "REMOVED")
            .filter_gt("metrics.impressions", 0)
            .filter_date_between("segments.date", &march())
            .order_by_desc("metrics.conversions")
            .build();

        assert_eq!(
            query,
            "SELECT campaign.id, campaign.name FROM campaign \
             WHERE campaign.status != 'REMOVED' \
             AND metrics.impressions > 0 \
             AND segments.date BETWEEN 20240301 AND 20240331 \
             ORDER BY metrics.conversions DESC"
        );
    }

    #[test]
    fn omits_where_without_filters() {
        let query = QueryBuilder::new("keyword_view")
            .select(&["ad_group_criterion.keyword.text"])
            .build();
        assert_eq!(
            query,
            "SELECT ad_group_criterion.keyword.text FROM keyword_view"
        );
    }

    #[test]
    fn escapes_quotes_in_literals() {
        let query = QueryBuilder::new("campaign")
            .select(&["campaign.id"])
            .filter_eq("campaign.name", "Bob's campaign")
            .build();
        assert!(query.contains(r"campaign.name = 'Bob\'s campaign'"));
    }
}
