//! Reaches a remote dispatch server over HTTP.

use std::time::Duration;

use reqwest::{Client, Url};
use rtooling::{
    Envelope, ToolCallRequest, ToolDescriptor, ToolDispatcher, ToolError, ToolExecutionContext,
    ToolFuture, ToolRegistry,
};

use crate::{DispatchConfig, DispatchError, SESSION_HEADER, TRACE_HEADER};

/// Every request is bounded by `timeout`; a silent server yields a `Timeout` envelope.
#[derive(Debug, Clone)]
pub struct HttpDispatchClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpDispatchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: DispatchConfig::default().call_timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DispatchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| DispatchError::transport(format!("invalid dispatch url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| DispatchError::transport("dispatch url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Downloads the remote catalog and rebuilds it as a local registry.
    pub async fn fetch_registry(&self) -> Result<ToolRegistry, DispatchError> {
        let response = self
            .client
            .get(self.endpoint(&["tools"])?)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let descriptors: Vec<ToolDescriptor> = response.json().await?;
        Ok(ToolRegistry::from_descriptors(descriptors)?)
    }

    async fn post_call(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
    ) -> Result<Envelope, ToolError> {
        let url = self
            .endpoint(&["tools", &request.tool_name])
            .map_err(|err| ToolError::internal(err.message))?;

        let mut builder = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header(SESSION_HEADER, context.session_id.as_str())
            .json(&request.parameters);
        if let Some(trace_id) = &context.trace_id {
            builder = builder.header(TRACE_HEADER, trace_id.as_str());
        }

        let response = builder.send().await.map_err(|err| {
            let error = if err.is_timeout() {
                ToolError::timeout(format!("dispatch request timed out: {err}"))
            } else {
                ToolError::internal(format!("dispatch request failed: {err}"))
            };
            error.with_retryable(true)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                ToolError::timeout(format!("dispatch response timed out: {err}")).with_retryable(true)
            } else {
                ToolError::internal(format!("failed to read dispatch response: {err}"))
            }
        })?;

        serde_json::from_slice(&body).map_err(|_| {
            ToolError::internal(format!(
                "dispatch server answered {status} without an envelope"
            ))
        })
    }
}

impl ToolDispatcher for HttpDispatchClient {
    fn dispatch<'a>(
        &'a self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Envelope> {
        Box::pin(async move {
            match self.post_call(&request, &context).await {
                Ok(envelope) => envelope,
                Err(error) => {
                    tracing::warn!(
                        tool_name = %request.tool_name,
                        error_kind = %error.kind,
                        "{}",
                        error.message
                    );
                    Envelope::from(error.with_tool_name(request.tool_name))
                }
            }
        })
    }
}
