//! # `termscope-sheets`: Google Sheets Output Plugin
//!
//! This crate implements the `SpreadsheetStore` trait from the core
//! `termscope` library against the Google Sheets v4 REST API, so the
//! pipeline can publish its report tables to a real spreadsheet.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::fmt::{self, Debug};
use std::sync::Arc;
use termscope::constants::SHEETS_API_BASE;
use termscope::errors::ReportError;
use termscope::providers::auth::AccessTokenProvider;
use termscope::spreadsheet::{SheetRef, SpreadsheetRef, SpreadsheetStore};
use thiserror::Error;
use tracing::{debug, info};

// --- Error Definitions ---

#[derive(Error, Debug, Clone)]
pub enum SheetStoreError {
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidUrl(String),
    #[error("Sheets API request failed: {0}")]
    Api(String),
    #[error("Unexpected Sheets API response: {0}")]
    Response(String),
}

impl From<reqwest::Error> for SheetStoreError {
    fn from(err: reqwest::Error) -> Self {
        SheetStoreError::Api(err.to_string())
    }
}

/// A helper to convert the specific `SheetStoreError` into the pipeline's
/// generic write failure.
impl From<SheetStoreError> for ReportError {
    fn from(err: SheetStoreError) -> Self {
        ReportError::Write(err.to_string())
    }
}

// --- Public Helper Functions ---

/// Extracts the spreadsheet id from a Google Sheets URL.
pub fn spreadsheet_id_from_url(url_str: &str) -> Result<String, SheetStoreError> {
    let parsed_url =
        reqwest::Url::parse(url_str).map_err(|e| SheetStoreError::InvalidUrl(format!("{e}")))?;

    let re = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9-_]+)")
        .map_err(|e| SheetStoreError::InvalidUrl(format!("Regex compilation failed: {e}")))?;
    let caps = re.captures(parsed_url.path()).ok_or_else(|| {
        SheetStoreError::InvalidUrl("Could not find sheet ID in URL path.".to_string())
    })?;

    caps.get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SheetStoreError::InvalidUrl("Sheet ID capture group is missing.".to_string()))
}

/// Renders the sheet title as a quoted A1 reference.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Renders an A1 range for a `height` × `width` block starting at
/// (`row`, `col`), both 1-based.
fn a1_range(title: &str, row: u32, col: u32, height: u32, width: u32) -> String {
    format!(
        "{}!{}{}:{}{}",
        sheet_range(title),
        column_letters(col),
        row,
        column_letters(col + width - 1),
        row + height - 1
    )
}

fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        letters.push(b'A' + ((col - 1) % 26) as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

// --- Store Implementation ---

/// Google Sheets implementation of the report `SpreadsheetStore`.
#[derive(Clone)]
pub struct GoogleSheetsStore {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl Debug for GoogleSheetsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSheetsStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsStore {
    pub fn new(auth: Arc<dyn AccessTokenProvider>) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ReportError::ReqwestClientBuild)?;
        Ok(Self {
            http,
            auth,
            base_url: SHEETS_API_BASE.to_string(),
        })
    }

    /// Points the store at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get(&self, url: &str) -> Result<Value, ReportError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(SheetStoreError::from)?;
        Self::parse(response).await
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &Value,
    ) -> Result<Value, ReportError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .request(method, url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(SheetStoreError::from)?;
        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<Value, ReportError> {
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(SheetStoreError::Api(format!("{status}: {detail}")).into());
        }
        let value = response.json().await.map_err(SheetStoreError::from)?;
        Ok(value)
    }
}

/// Extracts a `SpreadsheetRef` from a spreadsheet resource payload. The
/// URL falls back to the canonical edit URL when the API omits it.
fn spreadsheet_ref(value: &Value) -> Result<SpreadsheetRef, SheetStoreError> {
    let id = value
        .get("spreadsheetId")
        .and_then(Value::as_str)
        .ok_or_else(|| SheetStoreError::Response("spreadsheetId is missing".to_string()))?
        .to_string();
    let url = value
        .get("spreadsheetUrl")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{id}/edit"));
    Ok(SpreadsheetRef { id, url })
}

fn sheet_ref(properties: &Value) -> Result<SheetRef, SheetStoreError> {
    let id = properties
        .get("sheetId")
        .and_then(Value::as_i64)
        .ok_or_else(|| SheetStoreError::Response("sheetId is missing".to_string()))?;
    let title = properties
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| SheetStoreError::Response("sheet title is missing".to_string()))?
        .to_string();
    Ok(SheetRef { id, title })
}

#[async_trait]
impl SpreadsheetStore for GoogleSheetsStore {
    async fn create(&self, title: &str, rows: u32, cols: u32) -> Result<SpreadsheetRef, ReportError> {
        let body = json!({
            "properties": { "title": title },
            "sheets": [{
                "properties": {
                    "title": "Sheet1",
                    "gridProperties": { "rowCount": rows, "columnCount": cols }
                }
            }]
        });
        let value = self
            .send_json(
                reqwest::Method::POST,
                &format!("{}/v4/spreadsheets", self.base_url),
                &body,
            )
            .await?;
        let spreadsheet = spreadsheet_ref(&value)?;
        info!("Created spreadsheet {}", spreadsheet.url);
        Ok(spreadsheet)
    }

    async fn open_by_url(&self, url: &str) -> Result<SpreadsheetRef, ReportError> {
        let id = spreadsheet_id_from_url(url)?;
        debug!("Opening spreadsheet {id}");
        let value = self
            .get(&format!(
                "{}/v4/spreadsheets/{id}?fields=spreadsheetId,spreadsheetUrl",
                self.base_url
            ))
            .await?;
        Ok(spreadsheet_ref(&value)?)
    }

    async fn sheet_by_name(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<Option<SheetRef>, ReportError> {
        let value = self
            .get(&format!(
                "{}/v4/spreadsheets/{}?fields=sheets.properties",
                self.base_url, spreadsheet.id
            ))
            .await?;

        let sheets = value
            .get("sheets")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for sheet in &sheets {
            if let Some(properties) = sheet.get("properties") {
                if properties.get("title").and_then(Value::as_str) == Some(name) {
                    return Ok(Some(sheet_ref(properties)?));
                }
            }
        }
        Ok(None)
    }

    async fn insert_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<SheetRef, ReportError> {
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": name } } }]
        });
        let value = self
            .send_json(
                reqwest::Method::POST,
                &format!(
                    "{}/v4/spreadsheets/{}:batchUpdate",
                    self.base_url, spreadsheet.id
                ),
                &body,
            )
            .await?;

        let properties = value
            .get("replies")
            .and_then(Value::as_array)
            .and_then(|replies| replies.first())
            .and_then(|reply| reply.get("addSheet"))
            .and_then(|added| added.get("properties"))
            .ok_or_else(|| {
                SheetStoreError::Response("addSheet reply is missing properties".to_string())
            })?;
        Ok(sheet_ref(properties)?)
    }

    async fn clear_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        sheet: &SheetRef,
    ) -> Result<(), ReportError> {
        self.send_json(
            reqwest::Method::POST,
            &format!(
                "{}/v4/spreadsheets/{}/values/{}:clear",
                self.base_url,
                spreadsheet.id,
                sheet_range(&sheet.title)
            ),
            &json!({}),
        )
        .await?;
        Ok(())
    }

    async fn write_range(
        &self,
        spreadsheet: &SpreadsheetRef,
        sheet: &SheetRef,
        row: u32,
        col: u32,
        values: &[Vec<String>],
    ) -> Result<(), ReportError> {
        if values.is_empty() {
            return Ok(());
        }
        let width = values.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let range = a1_range(&sheet.title, row, col, values.len() as u32, width);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        self.send_json(
            reqwest::Method::PUT,
            &format!(
                "{}/v4/spreadsheets/{}/values/{}?valueInputOption=RAW",
                self.base_url, spreadsheet.id, range
            ),
            &body,
        )
        .await?;
        debug!("Wrote {range}");
        Ok(())
    }
}
