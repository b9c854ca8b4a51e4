//! # Google Ads Report Source
//!
//! The query transport seam for the pipeline and its implementation
//! against the `googleAds:search` REST endpoint. Each query yields one
//! finite result set of rows addressable by column name, the way the
//! query language spells them (`campaign.id`,
//! `metrics.conversions_value`).

use crate::errors::ReportError;
use crate::providers::auth::AccessTokenProvider;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde_json::{Map, Value};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

/// One report row, addressable by column name.
///
/// Backed by a flat map from dotted snake_case column paths to JSON
/// values. The REST payload nests objects under camelCase keys; rows are
/// flattened on construction so lookups match the query text.
#[derive(Debug, Clone, Default)]
pub struct AdsRow(Map<String, Value>);

impl AdsRow {
    /// Builds a row from explicit column/value pairs.
    pub fn from_pairs(pairs: &[(&str, Value)]) -> Self {
        let mut map = Map::new();
        for (column, value) in pairs {
            map.insert(column.to_string(), value.clone());
        }
        Self(map)
    }

    /// Flattens one REST result object into a row.
    pub fn from_result(value: &Value) -> Self {
        let mut map = Map::new();
        flatten_into(&mut map, "", value);
        Self(map)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// The column as a string. Errors when absent or not a string.
    pub fn text(&self, column: &str) -> Result<&str, ReportError> {
        self.get(column)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(column))
    }

    /// The column as a string, or `None` when the API omitted it.
    pub fn optional_text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// The column as an identifier string. Int64 identifiers arrive as
    /// JSON strings, but a bare number is accepted too.
    pub fn identifier(&self, column: &str) -> Result<String, ReportError> {
        match self.get(column) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(missing(column)),
        }
    }

    /// The column as an integer. Accepts JSON numbers and the API's
    /// stringified int64s.
    pub fn integer(&self, column: &str) -> Result<i64, ReportError> {
        match self.get(column) {
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| not_numeric(column)),
            Some(Value::String(s)) => s.parse().map_err(|_| not_numeric(column)),
            _ => Err(missing(column)),
        }
    }

    /// The column as a float. Accepts JSON numbers and numeric strings.
    pub fn metric(&self, column: &str) -> Result<f64, ReportError> {
        match self.get(column) {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| not_numeric(column)),
            Some(Value::String(s)) => s.parse().map_err(|_| not_numeric(column)),
            _ => Err(missing(column)),
        }
    }
}

fn missing(column: &str) -> ReportError {
    ReportError::Format(format!("column `{column}` is missing"))
}

fn not_numeric(column: &str) -> ReportError {
    ReportError::Format(format!("column `{column}` is not numeric"))
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, nested) in fields {
                let key = snake_case(key);
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(out, &path, nested);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// A source of Google Ads report rows.
///
/// One call executes one query and returns every matching row; the result
/// set is finite and consumed once. Implementations decide the transport.
#[async_trait]
pub trait ReportSource: Send + Sync + DynClone + Debug {
    /// Returns the name of the source (e.g. "GoogleAds").
    fn name(&self) -> &str;

    /// Executes a GAQL query and returns the matching rows.
    async fn search(&self, query: &str) -> Result<Vec<AdsRow>, ReportError>;
}

dyn_clone::clone_trait_object!(ReportSource);

/// A provider for the Google Ads reporting API.
#[derive(Clone)]
pub struct GoogleAdsProvider {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
    customer_id: String,
    developer_token: String,
    login_customer_id: Option<String>,
}

impl Debug for GoogleAdsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAdsProvider")
            .field("base_url", &self.base_url)
            .field("customer_id", &self.customer_id)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `GoogleAdsProvider` instances.
#[derive(Default)]
pub struct GoogleAdsProviderBuilder {
    customer_id: String,
    developer_token: String,
    login_customer_id: Option<String>,
    base_url: Option<String>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl GoogleAdsProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the customer ID to report on. Dashes are tolerated and
    /// stripped (`123-456-7890` and `1234567890` are equivalent).
    pub fn customer_id(mut self, customer_id: &str) -> Self {
        self.customer_id = customer_id.replace('-', "");
        self
    }

    /// Sets the Google Ads API developer token.
    pub fn developer_token(mut self, developer_token: String) -> Self {
        self.developer_token = developer_token;
        self
    }

    /// Sets the manager (MCC) customer ID when access goes through a
    /// manager account.
    pub fn login_customer_id(mut self, login_customer_id: Option<String>) -> Self {
        self.login_customer_id = login_customer_id.map(|id| id.replace('-', ""));
        self
    }

    /// Points the provider at a different API host. Used by tests.
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the token provider for request authorization.
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the `GoogleAdsProvider`, validating required fields.
    pub fn build(self) -> Result<GoogleAdsProvider, ReportError> {
        if self.customer_id.is_empty() {
            return Err(ReportError::MissingCustomerId);
        }
        if self.developer_token.is_empty() {
            return Err(ReportError::MissingDeveloperToken);
        }
        let auth = self
            .auth
            .ok_or_else(|| ReportError::Auth("No token provider configured".to_string()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(ReportError::ReqwestClientBuild)?;

        Ok(GoogleAdsProvider {
            http,
            auth,
            base_url: self
                .base_url
                .unwrap_or_else(|| crate::constants::GOOGLE_ADS_API_BASE.to_string()),
            customer_id: self.customer_id,
            developer_token: self.developer_token,
            login_customer_id: self.login_customer_id,
        })
    }
}

#[async_trait]
impl ReportSource for GoogleAdsProvider {
    fn name(&self) -> &str {
        "GoogleAds"
    }

    /// Executes the query via `googleAds:search`, following page tokens
    /// until the result set is exhausted.
    async fn search(&self, query: &str) -> Result<Vec<AdsRow>, ReportError> {
        debug!("--> Executing GAQL: {query}");
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/customers/{}/googleAds:search",
            self.base_url, self.customer_id
        );

        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut body = serde_json::json!({ "query": query });
            if let Some(next) = &page_token {
                body["pageToken"] = Value::String(next.clone());
            }

            let mut request = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .header("developer-token", &self.developer_token)
                .json(&body);
            if let Some(login) = &self.login_customer_id {
                request = request.header("login-customer-id", login);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ReportError::Query(e.to_string()))?;
            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(ReportError::Query(format!(
                    "search returned {status}: {detail}"
                )));
            }

            let page: Value = response
                .json()
                .await
                .map_err(|e| ReportError::Query(e.to_string()))?;
            if let Some(results) = page.get("results").and_then(Value::as_array) {
                rows.extend(results.iter().map(AdsRow::from_result));
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => page_token = Some(next.to_string()),
                _ => break,
            }
        }

        debug!("<-- {} rows", rows.len());
        Ok(rows)
    }
}
