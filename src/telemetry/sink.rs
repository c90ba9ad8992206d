//! Fire-and-forget JSON delivery to the optional analytics/metrics endpoint.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `payload` and wait for the response.
    pub async fn post<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .context("Failed to send telemetry request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telemetry endpoint error ({}): {}", status, body);
        }

        Ok(())
    }

    /// Serialize now and deliver in the background. Failures are logged,
    /// never returned; there is no retry.
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize telemetry payload: {}", e);
                return;
            }
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available, dropping telemetry payload");
            return;
        };

        let sink = self.clone();
        runtime.spawn(async move {
            if let Err(e) = sink.post(&value).await {
                warn!("Telemetry delivery failed: {:#}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collect"))
            .and(body_json(json!({"metric": "copySuccess", "value": 1.0})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpSink::new(format!("{}/collect", server.uri()));
        sink.post(&json!({"metric": "copySuccess", "value": 1.0}))
            .await
            .expect("post");
    }

    #[tokio::test]
    async fn test_post_reports_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let sink = HttpSink::new(server.uri());
        let err = sink.post(&json!({})).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_post_unreachable_endpoint_is_error() {
        let sink = HttpSink::new("http://127.0.0.1:9/unreachable");
        assert!(sink.post(&json!({})).await.is_err());
    }

    #[test]
    fn test_send_without_runtime_is_silent() {
        let sink = HttpSink::new("http://127.0.0.1:9/unreachable");
        sink.send(&json!({"event": "x"}));
    }
}
