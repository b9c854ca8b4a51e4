//! # Shared Constants
//!
//! Centralized values shared across the workspace crates, so sheet names
//! and API endpoints stay consistent between the pipeline, the providers,
//! and the tests.

/// Fixed name of the sheet holding the category-label table.
pub const CATEGORIES_SHEET: &str = "categories";

/// Fixed name of the sheet holding the search-term table.
pub const TERMS_SHEET: &str = "terms";

/// Title given to a newly created report spreadsheet.
pub const REPORT_SPREADSHEET_TITLE: &str = "PMax Search Terms";

/// Grid dimensions for a newly created report spreadsheet.
pub const NEW_SPREADSHEET_ROWS: u32 = 10_000;
pub const NEW_SPREADSHEET_COLS: u32 = 20;

/// Production endpoint of the Google Ads reporting API.
pub const GOOGLE_ADS_API_BASE: &str = "https://googleads.googleapis.com/v19";

/// Production endpoint of the Google Sheets API.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Production endpoint of the Gmail API.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com";

/// OAuth2 scopes required by the three Google APIs the pipeline touches.
pub const ADS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";
