//! Outbound alert transport
//!
//! Best-effort, fire-and-forget delivery of the storm alert text. The
//! concrete transport is a JSON webhook; the trait is the seam for anything
//! else (SNS, Alertmanager, chat hooks).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::error::DetectError;

/// Alert transport consumed by the detect loop
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert; no confirmation beyond transport acceptance
    async fn send(&self, subject: &str, body: &str) -> Result<(), DetectError>;
}

/// Webhook payload for a dispatched alert
#[derive(Debug, Serialize)]
struct WebhookAlert<'a> {
    subject: &'a str,
    message: &'a str,
}

/// Delivers alerts as JSON POSTs to a configured webhook URL
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookNotifier {
    pub fn new(client: Client, endpoint: &str) -> Result<Self, DetectError> {
        let endpoint = Url::parse(endpoint).map_err(|e| DetectError::InvalidConfig {
            reason: format!("invalid webhook URL '{}': {}", endpoint, e),
        })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), DetectError> {
        let payload = WebhookAlert {
            subject,
            message: body,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(DetectError::dispatch)?;

        if !response.status().is_success() {
            return Err(DetectError::dispatch(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        info!(subject = %subject, "Alert dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_posts_subject_and_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/alerts")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "subject": "Storm alert",
                "message": "storm incoming",
            })))
            .with_status(200)
            .create_async()
            .await;

        let notifier =
            WebhookNotifier::new(Client::new(), &format!("{}/alerts", server.url())).unwrap();
        notifier.send("Storm alert", "storm incoming").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_dispatch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/alerts")
            .with_status(500)
            .create_async()
            .await;

        let notifier =
            WebhookNotifier::new(Client::new(), &format!("{}/alerts", server.url())).unwrap();
        let err = notifier.send("Storm alert", "body").await.unwrap_err();

        assert!(matches!(err, DetectError::Dispatch { .. }));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(WebhookNotifier::new(Client::new(), "not a url").is_err());
    }
}
