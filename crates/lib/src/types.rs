//! # Core Data Model
//!
//! Transient row models for the enumeration and insight stages, plus the
//! reporting date window. All of these live for one run only; nothing here
//! is persisted.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// A closed date interval in the account's reporting time zone.
///
/// Rendered as unquoted 8-digit `yyyyMMdd` bounds for
/// `segments.date BETWEEN` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The interval covering the last `days` days up to today, where
    /// "today" is evaluated in `time_zone`.
    pub fn last_n_days(days: i64, time_zone: Tz) -> Self {
        let end = Utc::now().with_timezone(&time_zone).date_naive();
        let start = end - Duration::days(days);
        Self { start, end }
    }

    /// The interval bounds as 8-digit date strings.
    pub fn bounds(&self) -> (String, String) {
        (
            self.start.format("%Y%m%d").to_string(),
            self.end.format("%Y%m%d").to_string(),
        )
    }
}

/// One enumerated campaign with its aggregate metrics over the window.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub clicks: i64,
    pub impressions: i64,
    pub conversions: f64,
    pub conversions_value: f64,
}

/// A platform-generated grouping of semantically related search terms,
/// scoped to one campaign.
#[derive(Debug, Clone)]
pub struct CategoryLabel {
    pub id: String,
    pub label: String,
    pub clicks: i64,
    pub impressions: i64,
    pub conversions: f64,
    pub conversions_value: f64,
}

/// One search term under a category label, enriched with the
/// keyword-membership flag.
#[derive(Debug, Clone)]
pub struct SearchTerm {
    pub term: String,
    pub subcategory: String,
    pub clicks: i64,
    pub impressions: i64,
    pub conversions: f64,
    pub conversions_value: f64,
    pub exists_as_keyword: bool,
}
