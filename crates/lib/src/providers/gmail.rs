//! # Gmail Notifier
//!
//! Sends the run notification through the Gmail API: the RFC 822 message
//! is encoded as URL-safe base64 and posted to the authenticated user's
//! send endpoint.

use crate::errors::ReportError;
use crate::notify::{EmailMessage, Notifier};
use crate::providers::auth::AccessTokenProvider;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::info;

/// Gmail implementation of the run [`Notifier`].
#[derive(Clone)]
pub struct GmailNotifier {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl Debug for GmailNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailNotifier")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GmailNotifier {
    pub fn new(auth: Arc<dyn AccessTokenProvider>) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ReportError::ReqwestClientBuild)?;
        Ok(Self {
            http,
            auth,
            base_url: crate::constants::GMAIL_API_BASE.to_string(),
        })
    }

    /// Points the notifier at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Renders the message as RFC 822 text and encodes it the way the API
/// expects raw messages: URL-safe base64.
fn encode_message(message: &EmailMessage) -> String {
    let rfc822 = format!(
        "To: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        message.to, message.subject, message.body
    );
    URL_SAFE.encode(rfc822)
}

#[async_trait]
impl Notifier for GmailNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), ReportError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/gmail/v1/users/me/messages/send", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "raw": encode_message(message) }))
            .send()
            .await
            .map_err(|e| ReportError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ReportError::Notify(format!(
                "send returned {status}: {detail}"
            )));
        }

        info!("Notification '{}' sent to '{}'", message.subject, message.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_encoding_round_trips() {
        let message = EmailMessage {
            to: "ops@example.com".to_string(),
            subject: "PMax Search Terms Report Ready".to_string(),
            body: "All done.".to_string(),
        };
        let decoded = URL_SAFE.decode(encode_message(&message)).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.starts_with("To: ops@example.com\r\n"));
        assert!(text.contains("Subject: PMax Search Terms Report Ready\r\n"));
        assert!(text.ends_with("\r\n\r\nAll done."));
    }
}
