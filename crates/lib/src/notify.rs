//! # Run Notifications
//!
//! Exactly one email goes out per run, reporting success or failure. The
//! message composers are pure so the wording is testable without a
//! delivery transport.

use crate::config::ReportConfig;
use crate::errors::ReportError;
use async_trait::async_trait;
use std::fmt::Debug;

/// One outbound notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery transport for run notifications.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn send(&self, message: &EmailMessage) -> Result<(), ReportError>;
}

pub const SUCCESS_SUBJECT: &str = "PMax Search Terms Report Ready";
pub const FAILURE_SUBJECT: &str = "PMax Search Terms Report Failed";

const SIGNATURE: &str = "\n\nThis is an automated email sent by termscope.";

/// Composes the email sent when the report was generated and written.
pub fn success_message(config: &ReportConfig, spreadsheet_url: &str) -> EmailMessage {
    EmailMessage {
        to: config.email_address.clone(),
        subject: SUCCESS_SUBJECT.to_string(),
        body: format!(
            "The PMax Search Terms Report has been generated and is available at: \
             {spreadsheet_url}\n\nReport covers the last {} days.{SIGNATURE}",
            config.report_last_n_days
        ),
    }
}

/// Composes the email sent when a stage failed. It names no spreadsheet
/// URL: nothing was created or written on this path.
pub fn failure_message(config: &ReportConfig, error: &ReportError) -> EmailMessage {
    EmailMessage {
        to: config.email_address.clone(),
        subject: FAILURE_SUBJECT.to_string(),
        body: format!("The PMax Search Terms Report encountered an error: {error}{SIGNATURE}"),
    }
}
