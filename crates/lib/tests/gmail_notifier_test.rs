//! # Gmail Notifier Integration Tests

use anyhow::Result;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use httpmock::{Method, MockServer};
use serde_json::json;
use std::sync::Arc;
use termscope::errors::ReportError;
use termscope::notify::{EmailMessage, Notifier};
use termscope::providers::gmail::GmailNotifier;
use termscope_test_utils::StaticToken;

fn message() -> EmailMessage {
    EmailMessage {
        to: "ops@example.com".to_string(),
        subject: "PMax Search Terms Report Ready".to_string(),
        body: "The report is available.".to_string(),
    }
}

/// The exact raw payload the API should receive for [`message`]: the
/// RFC 822 rendering, URL-safe base64 encoded.
fn expected_raw() -> String {
    URL_SAFE.encode(
        "To: ops@example.com\r\n\
         Subject: PMax Search Terms Report Ready\r\n\
         Content-Type: text/plain; charset=\"UTF-8\"\r\n\
         \r\n\
         The report is available.",
    )
}

#[tokio::test]
async fn send_posts_the_encoded_message() -> Result<()> {
    let mock_server = MockServer::start();
    let send_mock = mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/gmail/v1/users/me/messages/send")
            .header("authorization", "Bearer test-token")
            .json_body(json!({ "raw": expected_raw() }));
        then.status(200).json_body(json!({ "id": "m1" }));
    });

    let notifier = GmailNotifier::new(Arc::new(StaticToken::new("test-token")))?
        .with_base_url(mock_server.base_url());

    notifier.send(&message()).await?;

    send_mock.assert();
    Ok(())
}

#[tokio::test]
async fn transport_errors_map_to_notify_failures() -> Result<()> {
    let mock_server = MockServer::start();
    mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/gmail/v1/users/me/messages/send");
        then.status(500).body("backend unavailable");
    });

    let notifier = GmailNotifier::new(Arc::new(StaticToken::new("test-token")))?
        .with_base_url(mock_server.base_url());

    let result = notifier.send(&message()).await;
    match result {
        Err(ReportError::Notify(detail)) => assert!(detail.contains("500")),
        other => panic!("expected a notify failure, got {other:?}"),
    }
    Ok(())
}
