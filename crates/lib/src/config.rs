//! # Report Configuration
//!
//! One immutable configuration struct passed by reference into the pipeline
//! entry point. Every field carries a default matching the stock report, so
//! a deserialized `{}` or `ReportConfig::default()` produces a runnable
//! configuration.

use chrono_tz::Tz;
use serde::Deserialize;

/// Configuration for a single report run.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Limit the output to rows with at least this many impressions.
    #[serde(default = "default_min_impressions")]
    pub min_impressions: i64,
    /// URL of an existing spreadsheet to overwrite. Blank or absent means a
    /// new spreadsheet is created for the run.
    #[serde(default)]
    pub spreadsheet_url: Option<String>,
    /// The number of days to include in the report.
    #[serde(default = "default_report_last_n_days")]
    pub report_last_n_days: i64,
    /// Notification recipient. May be blank; the send is still attempted
    /// and its outcome reported as a notification failure.
    #[serde(default)]
    pub email_address: String,
    /// Restrict the campaign enumeration to Performance Max campaigns.
    #[serde(default = "default_pmax_only")]
    pub pmax_only: bool,
    /// Reporting time zone of the account; date windows are computed here.
    #[serde(default = "default_time_zone")]
    pub time_zone: Tz,
}

impl ReportConfig {
    /// The configured spreadsheet URL, with blank treated as unset.
    pub fn target_spreadsheet_url(&self) -> Option<&str> {
        self.spreadsheet_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_impressions: default_min_impressions(),
            spreadsheet_url: None,
            report_last_n_days: default_report_last_n_days(),
            email_address: String::new(),
            pmax_only: default_pmax_only(),
            time_zone: default_time_zone(),
        }
    }
}

fn default_min_impressions() -> i64 {
    10
}

fn default_report_last_n_days() -> i64 {
    30
}

fn default_pmax_only() -> bool {
    true
}

fn default_time_zone() -> Tz {
    chrono_tz::UTC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_stock_defaults() {
        let config: ReportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.min_impressions, 10);
        assert_eq!(config.report_last_n_days, 30);
        assert!(config.pmax_only);
        assert!(config.spreadsheet_url.is_none());
        assert!(config.email_address.is_empty());
        assert_eq!(config.time_zone, chrono_tz::UTC);
    }

    #[test]
    fn blank_spreadsheet_url_counts_as_unset() {
        let config = ReportConfig {
            spreadsheet_url: Some(String::new()),
            ..ReportConfig::default()
        };
        assert_eq!(config.target_spreadsheet_url(), None);

        let config = ReportConfig {
            spreadsheet_url: Some("https://docs.google.com/spreadsheets/d/abc/edit".to_string()),
            ..ReportConfig::default()
        };
        assert_eq!(
            config.target_spreadsheet_url(),
            Some("https://docs.google.com/spreadsheets/d/abc/edit")
        );
    }
}
