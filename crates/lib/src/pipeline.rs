//! # Pipeline Runner
//!
//! Sequential orchestration of the four stages behind one error boundary:
//! keyword index, campaign enumeration, the nested insight fetch, then
//! publication. Exactly one notification email goes out per run, on both
//! paths.

use crate::campaigns::enumerate_campaigns;
use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::insights::collect_insights;
use crate::keywords::build_keyword_index;
use crate::notify::{failure_message, success_message, Notifier};
use crate::providers::ads::ReportSource;
use crate::spreadsheet::{publish_tables, SpreadsheetStore};
use crate::types::DateRange;
use tracing::{error, info};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub spreadsheet_url: String,
    pub category_rows: usize,
    pub term_rows: usize,
    pub window_days: i64,
}

/// Runs the full report: fetch, publish, then exactly one notification.
///
/// Any failure before or during publication is logged, converted into a
/// failure email, and returned with its stage-typed variant intact. The
/// notification send itself is unguarded; its failure takes precedence
/// over whatever the run produced.
pub async fn run(
    config: &ReportConfig,
    source: &dyn ReportSource,
    store: &dyn SpreadsheetStore,
    notifier: &dyn Notifier,
) -> Result<RunSummary, ReportError> {
    let range = DateRange::last_n_days(config.report_last_n_days, config.time_zone);
    info!(
        "Reporting window {} to {} ({} days)",
        range.start, range.end, config.report_last_n_days
    );

    match generate_and_publish(config, source, store, &range).await {
        Ok(summary) => {
            notifier
                .send(&success_message(config, &summary.spreadsheet_url))
                .await?;
            info!("spreadsheet: {}", summary.spreadsheet_url);
            Ok(summary)
        }
        Err(e) => {
            error!("Report run failed: {e}");
            notifier.send(&failure_message(config, &e)).await?;
            Err(e)
        }
    }
}

async fn generate_and_publish(
    config: &ReportConfig,
    source: &dyn ReportSource,
    store: &dyn SpreadsheetStore,
    range: &DateRange,
) -> Result<RunSummary, ReportError> {
    let keywords = build_keyword_index(source).await?;
    let campaigns = enumerate_campaigns(source, config, range).await?;
    let tables = collect_insights(source, config, range, &keywords, &campaigns).await?;
    let spreadsheet = publish_tables(store, config, &tables).await?;

    Ok(RunSummary {
        spreadsheet_url: spreadsheet.url,
        category_rows: tables.categories.data_rows(),
        term_rows: tables.terms.data_rows(),
        window_days: config.report_last_n_days,
    })
}
