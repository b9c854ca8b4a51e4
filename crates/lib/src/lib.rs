//! # termscope
//!
//! A reporting pipeline for Performance Max search terms. It queries the
//! Google Ads reporting API for campaign search-term insights, tags each
//! search term with whether it already exists as an enabled keyword, writes
//! the results into a Google spreadsheet, and sends a summary email.
//!
//! The pipeline is sequential: keyword index, campaign enumeration, the
//! nested insight fetch, then publication and notification. External
//! services sit behind traits ([`providers::ads::ReportSource`],
//! [`spreadsheet::SpreadsheetStore`], [`notify::Notifier`]) so the logic
//! can be driven against in-memory fakes.

pub mod campaigns;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gaql;
pub mod insights;
pub mod keywords;
pub mod notify;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod spreadsheet;
pub mod types;

pub use config::ReportConfig;
pub use errors::ReportError;
pub use pipeline::{run, RunSummary};
