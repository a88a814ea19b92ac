//! Remote-API-call stage unit.

use super::{StageUnit, UnitOutput};
use async_trait::async_trait;
use tracing::debug;

/// A unit that POSTs to a provider endpoint and maps the HTTP status to
/// success or failure.
///
/// The response status doubles as the outcome's exit-code equivalent, so
/// operators can tell a 429 quota rejection from a 5xx outage in the run
/// report.
#[derive(Debug, Clone)]
pub struct HttpCallUnit {
    name: String,
    url: String,
    payload: Option<serde_json::Value>,
    client: reqwest::Client,
}

impl HttpCallUnit {
    /// Creates a new remote-call unit targeting `url`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            payload: None,
            client: reqwest::Client::new(),
        }
    }

    /// Sets the JSON payload sent with the request.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The endpoint this unit calls.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StageUnit for HttpCallUnit {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> UnitOutput {
        debug!(unit = %self.name, url = %self.url, "calling provider endpoint");
        let request = match &self.payload {
            Some(payload) => self.client.post(&self.url).json(payload),
            None => self.client.post(&self.url),
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    UnitOutput {
                        success: true,
                        exit_code: Some(i32::from(status.as_u16())),
                        stdout: body,
                        stderr: String::new(),
                    }
                } else {
                    UnitOutput {
                        success: false,
                        exit_code: Some(i32::from(status.as_u16())),
                        stdout: body,
                        stderr: format!("provider returned {status}"),
                    }
                }
            }
            Err(err) => UnitOutput::fail(format!("request to {} failed: {err}", self.url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_unit_builder() {
        let unit = HttpCallUnit::new("videogen-remote", "http://localhost:8080/render")
            .with_payload(serde_json::json!({"preset": "vertical"}));

        assert_eq!(unit.name(), "videogen-remote");
        assert_eq!(unit.url(), "http://localhost:8080/render");
    }

    #[tokio::test]
    async fn test_http_unit_unreachable_endpoint_is_failure_data() {
        // Port 9 (discard) is closed in any sane test environment; the
        // connection error must surface as a failed UnitOutput, never a
        // panic or an Err.
        let unit = HttpCallUnit::new("videogen-remote", "http://127.0.0.1:9/render");

        let output = unit.invoke().await;
        assert!(!output.success);
        assert!(output.stderr.contains("failed"));
    }
}
