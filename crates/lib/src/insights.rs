//! # Search-Term Insights
//!
//! The nested fetch/enrich stage: category labels per campaign, then the
//! individual search terms per label. Each term is tagged with whether it
//! already exists as an enabled keyword, and formatted tuples accumulate
//! into the two report tables.

use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::gaql::QueryBuilder;
use crate::keywords::KeywordIndex;
use crate::providers::ads::{AdsRow, ReportSource};
use crate::report::{
    format_conversions, format_conversions_value, ReportTable, CATEGORY_HEADER, TERM_HEADER,
};
use crate::types::{Campaign, CategoryLabel, DateRange, SearchTerm};
use tracing::{debug, info};

/// The two tables accumulated across all campaigns.
#[derive(Debug, Clone)]
pub struct InsightTables {
    pub categories: ReportTable,
    pub terms: ReportTable,
}

impl InsightTables {
    pub fn new() -> Self {
        Self {
            categories: ReportTable::new(&CATEGORY_HEADER),
            terms: ReportTable::new(&TERM_HEADER),
        }
    }
}

impl Default for InsightTables {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryLabel {
    fn from_row(row: &AdsRow) -> Result<Self, ReportError> {
        Ok(Self {
            id: row.identifier("campaign_search_term_insight.id")?,
            label: row
                .text("campaign_search_term_insight.category_label")?
                .to_string(),
            clicks: row.integer("metrics.clicks")?,
            impressions: row.integer("metrics.impressions")?,
            conversions: row.metric("metrics.conversions")?,
            conversions_value: row.metric("metrics.conversions_value")?,
        })
    }
}

impl SearchTerm {
    fn from_row(row: &AdsRow, keywords: &KeywordIndex) -> Result<Self, ReportError> {
        let term = row.text("segments.search_term")?.to_string();
        // Lookup normalizes to lower case; the stored cell keeps the
        // original casing.
        let exists_as_keyword = keywords.contains(&term);
        Ok(Self {
            subcategory: row
                .optional_text("segments.search_subcategory")
                .unwrap_or_default()
                .to_string(),
            clicks: row.integer("metrics.clicks")?,
            impressions: row.integer("metrics.impressions")?,
            conversions: row.metric("metrics.conversions")?,
            conversions_value: row.metric("metrics.conversions_value")?,
            exists_as_keyword,
            term,
        })
    }
}

fn category_query(campaign_id: &str, config: &ReportConfig, range: &DateRange) -> String {
    QueryBuilder::new("campaign_search_term_insight")
        .select(&[
            "campaign_search_term_insight.category_label",
            "campaign_search_term_insight.id",
            "metrics.clicks",
            "metrics.impressions",
            "metrics.conversions",
            "metrics.conversions_value",
        ])
        .filter_date_between("segments.date", range)
        .filter_eq("campaign_search_term_insight.campaign_id", campaign_id)
        .filter_gte("metrics.impressions", config.min_impressions)
        .order_by_desc("metrics.conversions")
        .build()
}

fn term_query(campaign_id: &str, insight_id: &str, range: &DateRange) -> String {
    QueryBuilder::new("campaign_search_term_insight")
        .select(&[
            "metrics.clicks",
            "metrics.impressions",
            "metrics.conversions",
            "metrics.conversions_value",
            "segments.search_term",
            "segments.search_subcategory",
        ])
        .filter_date_between("segments.date", range)
        .filter_eq("campaign_search_term_insight.campaign_id", campaign_id)
        .filter_eq("campaign_search_term_insight.id", insight_id)
        .build()
}

/// Walks every campaign's category labels and their search terms,
/// appending formatted rows to both tables. Any query failure aborts the
/// run; there is no retry.
pub async fn collect_insights(
    source: &dyn ReportSource,
    config: &ReportConfig,
    range: &DateRange,
    keywords: &KeywordIndex,
    campaigns: &[Campaign],
) -> Result<InsightTables, ReportError> {
    let mut tables = InsightTables::new();

    for campaign in campaigns {
        info!("Fetching insights for campaign {} {}", campaign.id, campaign.name);

        let label_rows = source
            .search(&category_query(&campaign.id, config, range))
            .await?;
        for label_row in &label_rows {
            let label = CategoryLabel::from_row(label_row)?;
            tables.categories.push(vec![
                campaign.name.clone(),
                label.label.clone(),
                format_conversions_value(label.conversions_value),
                format_conversions(label.conversions),
                label.clicks.to_string(),
                label.impressions.to_string(),
            ]);

            let term_rows = source
                .search(&term_query(&campaign.id, &label.id, range))
                .await?;
            for term_row in &term_rows {
                let term = SearchTerm::from_row(term_row, keywords)?;
                // The term query filters by date only; re-apply the
                // impression floor before appending.
                if term.impressions < config.min_impressions {
                    continue;
                }
                tables.terms.push(vec![
                    campaign.name.clone(),
                    label.label.clone(),
                    term.subcategory.clone(),
                    term.term.clone(),
                    format_conversions_value(term.conversions_value),
                    format_conversions(term.conversions),
                    term.clicks.to_string(),
                    term.impressions.to_string(),
                    if term.exists_as_keyword { "Yes" } else { "No" }.to_string(),
                ]);
            }
        }
    }

    debug!(
        "Accumulated {} category rows and {} term rows",
        tables.categories.data_rows(),
        tables.terms.data_rows()
    );
    Ok(tables)
}
