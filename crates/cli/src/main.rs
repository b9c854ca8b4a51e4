//! # termscope-cli
//!
//! Command-line entry point for the PMax search-term report: parses flags
//! and environment, wires the Google providers behind the pipeline's trait
//! seams, and runs the report once.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use termscope::config::ReportConfig;
use termscope::constants::{ADS_SCOPE, GMAIL_SEND_SCOPE, SHEETS_SCOPE};
use termscope::providers::ads::GoogleAdsProviderBuilder;
use termscope::providers::auth::ServiceAccountAuth;
use termscope::providers::gmail::GmailNotifier;
use termscope_sheets::GoogleSheetsStore;
use tracing_subscriber::{fmt, EnvFilter};

/// Generates the PMax search-terms spreadsheet and emails a summary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Google Ads customer ID to report on (dashes allowed)
    #[arg(long, env = "ADS_CUSTOMER_ID")]
    customer_id: String,

    /// Google Ads API developer token
    #[arg(long, env = "ADS_DEVELOPER_TOKEN", hide_env_values = true)]
    developer_token: String,

    /// Manager (MCC) customer ID when access goes through a manager account
    #[arg(long, env = "ADS_LOGIN_CUSTOMER_ID")]
    login_customer_id: Option<String>,

    /// The number of days to include in the report
    #[arg(long, default_value_t = 30)]
    days: i64,

    /// Limit the output to rows with at least this many impressions
    #[arg(long, default_value_t = 10)]
    min_impressions: i64,

    /// Existing spreadsheet URL to overwrite; omit to create a new one
    #[arg(long, env = "REPORT_SPREADSHEET_URL")]
    spreadsheet_url: Option<String>,

    /// Notification recipient address
    #[arg(long, env = "REPORT_EMAIL_ADDRESS", default_value = "")]
    email_address: String,

    /// Include every channel type instead of Performance Max only
    #[arg(long)]
    all_channels: bool,

    /// Account reporting time zone (e.g. "America/New_York")
    #[arg(long, env = "ADS_TIME_ZONE", default_value = "UTC")]
    time_zone: chrono_tz::Tz,
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        ReportConfig {
            min_impressions: self.min_impressions,
            spreadsheet_url: self.spreadsheet_url.clone(),
            report_last_n_days: self.days,
            email_address: self.email_address.clone(),
            pmax_only: !self.all_channels,
            time_zone: self.time_zone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = cli.report_config();

    let auth = Arc::new(
        ServiceAccountAuth::from_env(&[ADS_SCOPE, SHEETS_SCOPE, GMAIL_SEND_SCOPE])
            .await
            .context("loading Google service account credentials")?,
    );

    let source = GoogleAdsProviderBuilder::new()
        .customer_id(&cli.customer_id)
        .developer_token(cli.developer_token.clone())
        .login_customer_id(cli.login_customer_id.clone())
        .auth(auth.clone())
        .build()?;
    let store = GoogleSheetsStore::new(auth.clone())?;
    let notifier = GmailNotifier::new(auth)?;

    match termscope::pipeline::run(&config, &source, &store, &notifier).await {
        Ok(summary) => {
            println!(
                "✅ Report ready: {} ({} category rows, {} term rows over {} days)",
                summary.spreadsheet_url,
                summary.category_rows,
                summary.term_rows,
                summary.window_days
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Report failed: {e}");
            std::process::exit(1);
        }
    }
}
