//! # Shared Test Doubles
//!
//! In-memory stand-ins for the pipeline's provider seams, so tests are
//! isolated and repeatable: a scripted report source, an in-memory
//! spreadsheet store that records clears and writes, a recording
//! notifier, and a static token provider.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, Once, RwLock};
use termscope::errors::ReportError;
use termscope::notify::{EmailMessage, Notifier};
use termscope::providers::ads::{AdsRow, ReportSource};
use termscope::providers::auth::AccessTokenProvider;
use termscope::spreadsheet::{SheetRef, SpreadsheetRef, SpreadsheetStore};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

/// Builds an `AdsRow` from column/value string pairs, mirroring how the
/// reporting API stringifies int64 fields.
pub fn row(pairs: &[(&str, &str)]) -> AdsRow {
    let owned: Vec<(&str, Value)> = pairs
        .iter()
        .map(|(column, value)| (*column, Value::String(value.to_string())))
        .collect();
    AdsRow::from_pairs(&owned)
}

// --- Scripted report source ---

/// A `ReportSource` that answers queries from scripted responses.
///
/// Responses and failures are keyed by a unique substring of the expected
/// query text; the first match wins. Unmatched queries return an empty
/// result set. Every query is recorded for inspection.
#[derive(Clone, Debug, Default)]
pub struct ScriptedReportSource {
    responses: Arc<RwLock<Vec<(String, Vec<AdsRow>)>>>,
    failures: Arc<RwLock<Vec<(String, String)>>>,
    call_history: Arc<RwLock<Vec<String>>>,
}

impl ScriptedReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the rows returned for any query containing `key`.
    pub fn add_response(&self, key: &str, rows: Vec<AdsRow>) {
        self.responses
            .write()
            .unwrap()
            .push((key.to_string(), rows));
    }

    /// Scripts a query failure for any query containing `key`.
    pub fn fail_when(&self, key: &str, message: &str) {
        self.failures
            .write()
            .unwrap()
            .push((key.to_string(), message.to_string()));
    }

    /// Every query text seen so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl ReportSource for ScriptedReportSource {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<AdsRow>, ReportError> {
        self.call_history.write().unwrap().push(query.to_string());

        if let Some((_, message)) = self
            .failures
            .read()
            .unwrap()
            .iter()
            .find(|(key, _)| query.contains(key.as_str()))
        {
            return Err(ReportError::Query(message.clone()));
        }

        for (key, rows) in self.responses.read().unwrap().iter() {
            if query.contains(key.as_str()) {
                return Ok(rows.clone());
            }
        }
        Ok(Vec::new())
    }
}

// --- In-memory spreadsheet store ---

#[derive(Debug, Clone)]
pub struct MemorySheet {
    pub id: i64,
    pub title: String,
    pub values: Vec<Vec<String>>,
    pub clear_count: usize,
}

#[derive(Debug, Clone)]
pub struct MemorySpreadsheet {
    pub id: String,
    pub url: String,
    pub sheets: Vec<MemorySheet>,
}

#[derive(Debug, Default)]
struct MemoryState {
    spreadsheets: Vec<MemorySpreadsheet>,
    next_sheet_id: i64,
    created: usize,
    write_calls: usize,
}

/// An in-memory `SpreadsheetStore` recording every clear and range write.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetStore {
    inner: Arc<Mutex<MemoryState>>,
}

fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}/edit")
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds an existing, empty spreadsheet and returns its URL.
    pub fn seed_spreadsheet(&self, id: &str) -> String {
        let url = spreadsheet_url(id);
        self.inner.lock().unwrap().spreadsheets.push(MemorySpreadsheet {
            id: id.to_string(),
            url: url.clone(),
            sheets: Vec::new(),
        });
        url
    }

    /// Pre-seeds a sheet with existing values inside a seeded spreadsheet.
    pub fn seed_sheet(&self, spreadsheet_id: &str, title: &str, values: Vec<Vec<String>>) {
        let mut state = self.inner.lock().unwrap();
        let sheet_id = state.next_sheet_id;
        state.next_sheet_id += 1;
        let spreadsheet = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == spreadsheet_id)
            .expect("seed_sheet: unknown spreadsheet");
        spreadsheet.sheets.push(MemorySheet {
            id: sheet_id,
            title: title.to_string(),
            values,
            clear_count: 0,
        });
    }

    /// Snapshot of one sheet, when present.
    pub fn sheet(&self, spreadsheet_id: &str, title: &str) -> Option<MemorySheet> {
        self.inner
            .lock()
            .unwrap()
            .spreadsheets
            .iter()
            .find(|s| s.id == spreadsheet_id)
            .and_then(|s| s.sheets.iter().find(|sheet| sheet.title == title))
            .cloned()
    }

    /// How many spreadsheets `create` produced.
    pub fn created_count(&self) -> usize {
        self.inner.lock().unwrap().created
    }

    /// How many bulk range writes happened.
    pub fn write_calls(&self) -> usize {
        self.inner.lock().unwrap().write_calls
    }
}

#[async_trait]
impl SpreadsheetStore for MemorySheetStore {
    async fn create(
        &self,
        _title: &str,
        _rows: u32,
        _cols: u32,
    ) -> Result<SpreadsheetRef, ReportError> {
        let mut state = self.inner.lock().unwrap();
        state.created += 1;
        let id = format!("mem-{}", state.created);
        let url = spreadsheet_url(&id);
        state.spreadsheets.push(MemorySpreadsheet {
            id: id.clone(),
            url: url.clone(),
            sheets: Vec::new(),
        });
        Ok(SpreadsheetRef { id, url })
    }

    async fn open_by_url(&self, url: &str) -> Result<SpreadsheetRef, ReportError> {
        self.inner
            .lock()
            .unwrap()
            .spreadsheets
            .iter()
            .find(|s| s.url == url)
            .map(|s| SpreadsheetRef {
                id: s.id.clone(),
                url: s.url.clone(),
            })
            .ok_or_else(|| ReportError::Write(format!("no spreadsheet at {url}")))
    }

    async fn sheet_by_name(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<Option<SheetRef>, ReportError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .spreadsheets
            .iter()
            .find(|s| s.id == spreadsheet.id)
            .and_then(|s| s.sheets.iter().find(|sheet| sheet.title == name))
            .map(|sheet| SheetRef {
                id: sheet.id,
                title: sheet.title.clone(),
            }))
    }

    async fn insert_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<SheetRef, ReportError> {
        let mut state = self.inner.lock().unwrap();
        let sheet_id = state.next_sheet_id;
        state.next_sheet_id += 1;
        let target = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == spreadsheet.id)
            .ok_or_else(|| ReportError::Write(format!("unknown spreadsheet {}", spreadsheet.id)))?;
        target.sheets.push(MemorySheet {
            id: sheet_id,
            title: name.to_string(),
            values: Vec::new(),
            clear_count: 0,
        });
        Ok(SheetRef {
            id: sheet_id,
            title: name.to_string(),
        })
    }

    async fn clear_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        sheet: &SheetRef,
    ) -> Result<(), ReportError> {
        let mut state = self.inner.lock().unwrap();
        let target = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == spreadsheet.id)
            .and_then(|s| s.sheets.iter_mut().find(|t| t.id == sheet.id))
            .ok_or_else(|| ReportError::Write(format!("unknown sheet {}", sheet.title)))?;
        target.values.clear();
        target.clear_count += 1;
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
        let mut state = self.inner.lock().unwrap();
        state.write_calls += 1;
        let target = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == spreadsheet.id)
            .and_then(|s| s.sheets.iter_mut().find(|t| t.id == sheet.id))
            .ok_or_else(|| ReportError::Write(format!("unknown sheet {}", sheet.title)))?;

        let row = row as usize - 1;
        let col = col as usize - 1;
        for (i, source_row) in values.iter().enumerate() {
            while target.values.len() <= row + i {
                target.values.push(Vec::new());
            }
            let dest = &mut target.values[row + i];
            while dest.len() < col + source_row.len() {
                dest.push(String::new());
            }
            dest[col..col + source_row.len()].clone_from_slice(source_row);
        }
        Ok(())
    }
}

// --- Recording notifier ---

/// A `Notifier` that records every message, optionally failing instead.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail with the given message.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    /// Every message delivered so far.
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), ReportError> {
        if let Some(error) = self.fail_with.lock().unwrap().as_ref() {
            return Err(ReportError::Notify(error.clone()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// --- Static token provider ---

/// An `AccessTokenProvider` that returns a fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ReportError> {
        Ok(self.0.clone())
    }
}
