//! HTTP client for the downstream content tools.

use async_trait::async_trait;
use tracing::debug;
use tutor_application::{ToolInvocationError, ToolServicePort};
use tutor_domain::core::string::truncate;
use tutor_domain::{AttemptId, ToolType};

/// Header carrying the attempt id so the service can deduplicate replays
pub const ATTEMPT_ID_HEADER: &str = "Idempotency-Key";

/// Longest error body kept in a [`ToolInvocationError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// One POST per invocation; retries and timeouts belong to the caller.
pub struct HttpToolService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToolService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, tool_type: ToolType) -> String {
        format!("{}{}", self.base_url, tool_type.endpoint_path())
    }
}

fn map_transport_error(error: &reqwest::Error) -> ToolInvocationError {
    if error.is_timeout() {
        ToolInvocationError::Timeout
    } else {
        ToolInvocationError::Network(error.to_string())
    }
}

fn status_error(code: u16, body: &str) -> ToolInvocationError {
    ToolInvocationError::Status {
        code,
        body: truncate(body.trim(), MAX_ERROR_BODY),
    }
}

fn parse_body(text: &str) -> Result<serde_json::Value, ToolInvocationError> {
    serde_json::from_str(text)
        .map_err(|e| ToolInvocationError::MalformedResponse(format!("invalid JSON: {}", e)))
}

#[async_trait]
impl ToolServicePort for HttpToolService {
    async fn invoke(
        &self,
        tool_type: ToolType,
        body: &serde_json::Value,
        attempt_id: &AttemptId,
    ) -> Result<serde_json::Value, ToolInvocationError> {
        let url = self.endpoint(tool_type);
        debug!("POST {} ({})", url, attempt_id);

        let response = self
            .client
            .post(&url)
            .header(ATTEMPT_ID_HEADER, attempt_id.to_string())
            .json(body)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| map_transport_error(&e))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }

        parse_body(&text)
    }
}
