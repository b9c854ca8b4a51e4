//! # Spreadsheet Output
//!
//! The storage seam for report publication, mirroring the platform
//! surface (create, open by URL, sheet lookup/insert, clear, bulk range
//! write), and the publisher that flushes the accumulated tables into
//! their named sheets.

use crate::config::ReportConfig;
use crate::constants::{
    CATEGORIES_SHEET, NEW_SPREADSHEET_COLS, NEW_SPREADSHEET_ROWS, REPORT_SPREADSHEET_TITLE,
    TERMS_SHEET,
};
use crate::errors::ReportError;
use crate::insights::InsightTables;
use crate::report::ReportTable;
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::info;

/// Identifies one spreadsheet held by the storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRef {
    pub id: String,
    pub url: String,
}

/// Identifies one sheet (tab) within a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub id: i64,
    pub title: String,
}

/// Storage backend for report spreadsheets.
#[async_trait]
pub trait SpreadsheetStore: Send + Sync + Debug {
    /// Creates a new spreadsheet with the given grid dimensions.
    async fn create(&self, title: &str, rows: u32, cols: u32) -> Result<SpreadsheetRef, ReportError>;

    /// Opens an existing spreadsheet by its URL.
    async fn open_by_url(&self, url: &str) -> Result<SpreadsheetRef, ReportError>;

    /// Looks up a sheet by name, returning `None` when absent.
    async fn sheet_by_name(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<Option<SheetRef>, ReportError>;

    /// Adds a new, empty sheet with the given name.
    async fn insert_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        name: &str,
    ) -> Result<SheetRef, ReportError>;

    /// Removes all values from the sheet.
    async fn clear_sheet(
        &self,
        spreadsheet: &SpreadsheetRef,
        sheet: &SheetRef,
    ) -> Result<(), ReportError>;

    /// Writes `values` as one bulk range starting at (`row`, `col`),
    /// both 1-based.
    async fn write_range(
        &self,
        spreadsheet: &SpreadsheetRef,
        sheet: &SheetRef,
        row: u32,
        col: u32,
        values: &[Vec<String>],
    ) -> Result<(), ReportError>;
}

/// Resolves the target spreadsheet and flushes both tables into their
/// fixed-name sheets. Existing sheet contents are cleared, never appended
/// to; a table holding only its header produces no range write.
pub async fn publish_tables(
    store: &dyn SpreadsheetStore,
    config: &ReportConfig,
    tables: &InsightTables,
) -> Result<SpreadsheetRef, ReportError> {
    let spreadsheet = match config.target_spreadsheet_url() {
        Some(url) => store.open_by_url(url).await?,
        None => {
            store
                .create(
                    REPORT_SPREADSHEET_TITLE,
                    NEW_SPREADSHEET_ROWS,
                    NEW_SPREADSHEET_COLS,
                )
                .await?
        }
    };

    write_table(store, &spreadsheet, CATEGORIES_SHEET, &tables.categories).await?;
    write_table(store, &spreadsheet, TERMS_SHEET, &tables.terms).await?;

    Ok(spreadsheet)
}

async fn write_table(
    store: &dyn SpreadsheetStore,
    spreadsheet: &SpreadsheetRef,
    name: &str,
    table: &ReportTable,
) -> Result<(), ReportError> {
    let sheet = match store.sheet_by_name(spreadsheet, name).await? {
        Some(sheet) => {
            store.clear_sheet(spreadsheet, &sheet).await?;
            sheet
        }
        None => store.insert_sheet(spreadsheet, name).await?,
    };

    if !table.has_data() {
        info!("Sheet '{name}' has no data rows, skipping write");
        return Ok(());
    }

    let values = table.to_values();
    store.write_range(spreadsheet, &sheet, 1, 1, &values).await?;
    info!("Wrote {} rows to sheet '{name}'", values.len());
    Ok(())
}
