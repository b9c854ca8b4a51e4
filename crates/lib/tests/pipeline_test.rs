//! # Pipeline Integration Tests
//!
//! Drives the full report run against the in-memory fakes: a scripted
//! report source, an in-memory spreadsheet store, and a recording
//! notifier.

use anyhow::Result;
use termscope::config::ReportConfig;
use termscope::constants::{CATEGORIES_SHEET, TERMS_SHEET};
use termscope::errors::ReportError;
use termscope::notify::{FAILURE_SUBJECT, SUCCESS_SUBJECT};
use termscope::pipeline;
use termscope_test_utils::{
    row, setup_tracing, MemorySheetStore, RecordingNotifier, ScriptedReportSource,
};

fn test_config() -> ReportConfig {
    ReportConfig {
        email_address: "ops@example.com".to_string(),
        ..ReportConfig::default()
    }
}

/// Scripts one campaign ("PMax One", id 101) with one category label
/// ("running shoes", id lab1) and three search terms: one matching an
/// enabled keyword case-insensitively, one below the impression floor,
/// one above the floor without a keyword match.
fn script_happy_path(source: &ScriptedReportSource) {
    source.add_response(
        "FROM keyword_view",
        vec![
            row(&[("ad_group_criterion.keyword.text", "Blue Shoes")]),
            row(&[("ad_group_criterion.keyword.text", "running socks")]),
        ],
    );
    source.add_response(
        "FROM campaign WHERE",
        vec![row(&[
            ("campaign.id", "101"),
            ("campaign.name", "PMax One"),
            ("metrics.clicks", "120"),
            ("metrics.impressions", "2400"),
            ("metrics.conversions", "12.5"),
            ("metrics.conversions_value", "1034.25"),
        ])],
    );
    source.add_response(
        "campaign_search_term_insight.campaign_id = '101' AND metrics.impressions",
        vec![row(&[
            ("campaign_search_term_insight.id", "lab1"),
            ("campaign_search_term_insight.category_label", "running shoes"),
            ("metrics.clicks", "80"),
            ("metrics.impressions", "1200"),
            ("metrics.conversions", "3"),
            ("metrics.conversions_value", "42.5"),
        ])],
    );
    source.add_response(
        "campaign_search_term_insight.id = 'lab1'",
        vec![
            row(&[
                ("segments.search_term", "BLUE Shoes"),
                ("segments.search_subcategory", "shoes"),
                ("metrics.clicks", "40"),
                ("metrics.impressions", "150"),
                ("metrics.conversions", "2"),
                ("metrics.conversions_value", "30"),
            ]),
            row(&[
                ("segments.search_term", "green sandals"),
                ("segments.search_subcategory", "sandals"),
                ("metrics.clicks", "1"),
                ("metrics.impressions", "9"),
                ("metrics.conversions", "0"),
                ("metrics.conversions_value", "0"),
            ]),
            row(&[
                ("segments.search_term", "red laces"),
                ("segments.search_subcategory", "laces"),
                ("metrics.clicks", "10"),
                ("metrics.impressions", "50"),
                ("metrics.conversions", "1"),
                ("metrics.conversions_value", "12.495"),
            ]),
        ],
    );
}

#[tokio::test]
async fn full_run_writes_both_sheets_and_notifies_success() -> Result<()> {
    setup_tracing();
    let source = ScriptedReportSource::new();
    script_happy_path(&source);
    let store = MemorySheetStore::new();
    let notifier = RecordingNotifier::new();
    let config = test_config();

    let summary = pipeline::run(&config, &source, &store, &notifier).await?;

    assert_eq!(summary.category_rows, 1);
    assert_eq!(summary.term_rows, 2);
    assert_eq!(summary.window_days, 30);
    assert_eq!(store.created_count(), 1);

    let categories = store.sheet("mem-1", CATEGORIES_SHEET).unwrap();
    assert_eq!(categories.values.len(), 2);
    assert_eq!(
        categories.values[1],
        vec!["PMax One", "running shoes", "42.50", "3.0", "80", "1200"]
    );

    let terms = store.sheet("mem-1", TERMS_SHEET).unwrap();
    assert_eq!(terms.values.len(), 3);
    assert_eq!(
        terms.values[0],
        vec![
            "Campaign Name",
            "Category Label",
            "Subcat",
            "Search Term",
            "Conv Val",
            "Conv",
            "Clicks",
            "Imp",
            "Exists as Keyword?"
        ]
    );
    // "BLUE Shoes" matches the enabled keyword "Blue Shoes" despite the
    // casing; the cell keeps the original casing.
    assert_eq!(
        terms.values[1],
        vec![
            "PMax One",
            "running shoes",
            "shoes",
            "BLUE Shoes",
            "30.00",
            "2.0",
            "40",
            "150",
            "Yes"
        ]
    );
    assert_eq!(
        terms.values[2],
        vec![
            "PMax One",
            "running shoes",
            "laces",
            "red laces",
            "12.49",
            "1.0",
            "10",
            "50",
            "No"
        ]
    );

    let sent = notifier.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, SUCCESS_SUBJECT);
    assert_eq!(sent[0].to, "ops@example.com");
    assert!(sent[0].body.contains(&summary.spreadsheet_url));
    assert!(sent[0].body.contains("last 30 days"));

    Ok(())
}

#[tokio::test]
async fn terms_below_the_impression_floor_never_reach_the_table() -> Result<()> {
    let source = ScriptedReportSource::new();
    script_happy_path(&source);
    let store = MemorySheetStore::new();
    let notifier = RecordingNotifier::new();

    pipeline::run(&test_config(), &source, &store, &notifier).await?;

    let terms = store.sheet("mem-1", TERMS_SHEET).unwrap();
    for data_row in &terms.values[1..] {
        let impressions: i64 = data_row[7].parse()?;
        assert!(impressions >= 10, "row below floor: {data_row:?}");
    }
    assert!(!terms
        .values
        .iter()
        .any(|r| r.contains(&"green sandals".to_string())));

    Ok(())
}

#[tokio::test]
async fn zero_campaigns_skip_every_range_write() -> Result<()> {
    let source = ScriptedReportSource::new();
    source.add_response(
        "FROM keyword_view",
        vec![row(&[("ad_group_criterion.keyword.text", "shoes")])],
    );
    // No campaign response scripted: the enumerator sees an empty result.
    let store = MemorySheetStore::new();
    let notifier = RecordingNotifier::new();

    let summary = pipeline::run(&test_config(), &source, &store, &notifier).await?;

    assert_eq!(summary.category_rows, 0);
    assert_eq!(summary.term_rows, 0);
    // The spreadsheet and its sheets still exist, but nothing was written.
    assert_eq!(store.created_count(), 1);
    assert_eq!(store.write_calls(), 0);
    assert!(store.sheet("mem-1", CATEGORIES_SHEET).unwrap().values.is_empty());
    assert!(store.sheet("mem-1", TERMS_SHEET).unwrap().values.is_empty());

    let sent = notifier.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, SUCCESS_SUBJECT);

    Ok(())
}

#[tokio::test]
async fn rerun_against_an_existing_spreadsheet_overwrites_instead_of_appending() -> Result<()> {
    let source = ScriptedReportSource::new();
    script_happy_path(&source);

    let store = MemorySheetStore::new();
    let url = store.seed_spreadsheet("existing");
    let stale = vec![
        vec!["Campaign Name".to_string(), "stale".to_string()],
        vec!["Old Campaign".to_string(), "old label".to_string()],
        vec!["Old Campaign".to_string(), "older label".to_string()],
    ];
    store.seed_sheet("existing", CATEGORIES_SHEET, stale.clone());
    store.seed_sheet("existing", TERMS_SHEET, stale);

    let notifier = RecordingNotifier::new();
    let config = ReportConfig {
        spreadsheet_url: Some(url.clone()),
        ..test_config()
    };

    let summary = pipeline::run(&config, &source, &store, &notifier).await?;

    assert_eq!(summary.spreadsheet_url, url);
    assert_eq!(store.created_count(), 0);

    let categories = store.sheet("existing", CATEGORIES_SHEET).unwrap();
    assert_eq!(categories.clear_count, 1);
    // Two rows: header plus the fresh one. The stale rows are gone.
    assert_eq!(categories.values.len(), 2);
    assert!(!categories
        .values
        .iter()
        .any(|r| r.contains(&"Old Campaign".to_string())));

    Ok(())
}

#[tokio::test]
async fn query_failure_mid_insights_sends_one_failure_email_and_writes_nothing() -> Result<()> {
    let source = ScriptedReportSource::new();
    script_happy_path(&source);
    source.fail_when("campaign_search_term_insight.id = 'lab1'", "quota exceeded");

    let store = MemorySheetStore::new();
    let notifier = RecordingNotifier::new();

    let result = pipeline::run(&test_config(), &source, &store, &notifier).await;

    assert!(matches!(result, Err(ReportError::Query(_))));
    assert_eq!(store.created_count(), 0);
    assert_eq!(store.write_calls(), 0);

    let sent = notifier.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, FAILURE_SUBJECT);
    assert!(sent[0].body.contains("quota exceeded"));
    assert!(!sent[0].body.contains("https://docs.google.com"));

    Ok(())
}

#[tokio::test]
async fn notification_failure_is_unguarded_and_surfaces() {
    let source = ScriptedReportSource::new();
    script_happy_path(&source);
    let store = MemorySheetStore::new();
    let notifier = RecordingNotifier::new();
    notifier.fail_with("mail transport down");

    let result = pipeline::run(&test_config(), &source, &store, &notifier).await;

    assert!(matches!(result, Err(ReportError::Notify(_))));
    assert!(notifier.sent_messages().is_empty());
}
