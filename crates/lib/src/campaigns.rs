//! # Campaign Enumeration
//!
//! Queries the campaigns worth reporting on: not removed, above the
//! impression floor inside the window, optionally restricted to
//! Performance Max, ordered by conversions descending.

use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::gaql::QueryBuilder;
use crate::providers::ads::{AdsRow, ReportSource};
use crate::types::{Campaign, DateRange};
use tracing::info;

impl Campaign {
    fn from_row(row: &AdsRow) -> Result<Self, ReportError> {
        Ok(Self {
            id: row.identifier("campaign.id")?,
            name: row.text("campaign.name")?.to_string(),
            clicks: row.integer("metrics.clicks")?,
            impressions: row.integer("metrics.impressions")?,
            conversions: row.metric("metrics.conversions")?,
            conversions_value: row.metric("metrics.conversions_value")?,
        })
    }
}

fn campaign_query(config: &ReportConfig, range: &DateRange) -> String {
    let mut query = QueryBuilder::new("campaign")
        .select(&[
            "campaign.id",
            "campaign.name",
            "metrics.clicks",
            "metrics.impressions",
            "metrics.conversions",
            "metrics.conversions_value",
        ])
        .filter_neq("campaign.status", "REMOVED")
        .filter_gt("metrics.impressions", 0)
        .filter_date_between("segments.date", range)
        .filter_gte("metrics.impressions", config.min_impressions);
    if config.pmax_only {
        query = query.filter_eq("campaign.advertising_channel_type", "PERFORMANCE_MAX");
    }
    query.order_by_desc("metrics.conversions").build()
}

/// Enumerates the campaigns matching the status, impression, and date
/// filters. The result is one finite pass; the underlying query cursor is
/// consumed once.
pub async fn enumerate_campaigns(
    source: &dyn ReportSource,
    config: &ReportConfig,
    range: &DateRange,
) -> Result<Vec<Campaign>, ReportError> {
    let rows = source.search(&campaign_query(config, range)).await?;
    let campaigns = rows
        .iter()
        .map(Campaign::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    info!("Enumerated {} campaigns", campaigns.len());
    Ok(campaigns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    #[test]
    fn query_applies_every_filter() {
        let config = ReportConfig::default();
        let query = campaign_query(&config, &range());
        assert!(query.contains("campaign.status != 'REMOVED'"));
        assert!(query.contains("metrics.impressions > 0"));
        assert!(query.contains("segments.date BETWEEN 20240301 AND 20240331"));
        assert!(query.contains("metrics.impressions >= 10"));
        assert!(query.contains("campaign.advertising_channel_type = 'PERFORMANCE_MAX'"));
        assert!(query.ends_with("ORDER BY metrics.conversions DESC"));
    }

    #[test]
    fn channel_filter_is_dropped_when_not_pmax_only() {
        let config = ReportConfig {
            pmax_only: false,
            ..ReportConfig::default()
        };
        let query = campaign_query(&config, &range());
        assert!(!query.contains("advertising_channel_type"));
    }
}
