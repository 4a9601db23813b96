//! The HTTP hop to a chat-completions endpoint.

use reqwest::{Client, Response};

use crate::{ProviderError, ProviderFuture};

use super::auth::OpenAiAuth;
use super::wire::{ChatCompletionReply, ChatCompletionRequest, error_message};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<ChatCompletionReply, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Points the transport at an OpenAI-compatible gateway, e.g.
    /// `http://127.0.0.1:4000/v1`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn classify_failure(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| format!("chat completion failed with status {status}"));

        ProviderError::from_status(status.as_u16(), message)
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<ChatCompletionReply, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(auth.bearer_token())
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::classify_failure(response).await);
            }

            response
                .json::<ChatCompletionReply>()
                .await
                .map_err(|err| ProviderError::transport(format!("unreadable reply: {err}")))
        })
    }
}
