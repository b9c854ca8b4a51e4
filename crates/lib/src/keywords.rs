//! # Keyword Index
//!
//! Builds the membership set of enabled keywords that search terms are
//! checked against. Built once per run, read-only afterward.

use crate::errors::ReportError;
use crate::gaql::QueryBuilder;
use crate::providers::ads::ReportSource;
use std::collections::HashSet;
use tracing::info;

/// Case-insensitive membership set of keyword texts.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    terms: HashSet<String>,
}

impl KeywordIndex {
    pub fn insert(&mut self, text: &str) {
        self.terms.insert(text.to_lowercase());
    }

    /// Case-insensitive lookup. No trimming, stemming, or partial
    /// matching.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn keyword_query() -> String {
    QueryBuilder::new("keyword_view")
        .select(&["ad_group_criterion.keyword.text"])
        .filter_eq("ad_group_criterion.status", "ENABLED")
        .filter_eq("campaign.status", "ENABLED")
        .filter_eq("ad_group.status", "ENABLED")
        .build()
}

/// Fetches every enabled keyword across enabled campaigns and ad groups.
///
/// Query failures propagate unchanged; the caller's error boundary handles
/// them like any other fetch failure.
pub async fn build_keyword_index(source: &dyn ReportSource) -> Result<KeywordIndex, ReportError> {
    let rows = source.search(&keyword_query()).await?;
    let mut index = KeywordIndex::default();
    for row in &rows {
        index.insert(row.text("ad_group_criterion.keyword.text")?);
    }
    info!("Indexed {} enabled keywords", index.len());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut index = KeywordIndex::default();
        index.insert("Shoes");
        assert!(index.contains("SHOES"));
        assert!(index.contains("shoes"));
        assert!(!index.contains("shoe"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn lookup_does_not_trim() {
        let mut index = KeywordIndex::default();
        index.insert("blue shoes");
        assert!(!index.contains(" blue shoes"));
    }

    #[test]
    fn query_filters_all_three_statuses() {
        let query = keyword_query();
        assert!(query.contains("FROM keyword_view"));
        assert!(query.contains("ad_group_criterion.status = 'ENABLED'"));
        assert!(query.contains("campaign.status = 'ENABLED'"));
        assert!(query.contains("ad_group.status = 'ENABLED'"));
    }
}
