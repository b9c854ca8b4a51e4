use thiserror::Error;

/// Custom error types for the reporting pipeline.
///
/// Each variant identifies the stage that failed, so callers and tests can
/// tell a query failure from a spreadsheet or notification failure without
/// matching on message strings.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Google Ads query failed: {0}")]
    Query(String),
    #[error("Malformed report row: {0}")]
    Format(String),
    #[error("Spreadsheet write failed: {0}")]
    Write(String),
    #[error("Notification delivery failed: {0}")]
    Notify(String),
    #[error("Failed to obtain an access token: {0}")]
    Auth(String),
    #[error("Customer ID is missing")]
    MissingCustomerId,
    #[error("Developer token is missing")]
    MissingDeveloperToken,
    #[error("An unexpected internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}
