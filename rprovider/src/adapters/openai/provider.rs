//! [`ModelProvider`] implementation for chat-completions backends.

use std::sync::Arc;

use futures_timer::Delay;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, ProviderError,
    ProviderFuture, ProviderId, ProviderOperationHooks, RetryPolicy, SecureCredentialManager,
    execute_with_retry,
};

use super::auth::resolve_openai_auth;
use super::transport::OpenAiTransport;
use super::wire::ChatCompletionRequest;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct OpenAiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            fallback_model: DEFAULT_MODEL.to_string(),
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    /// Model used when a request leaves its model name blank.
    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub(crate) fn lower(
        &self,
        mut request: ModelRequest,
    ) -> Result<ChatCompletionRequest, ProviderError> {
        if request.model.trim().is_empty() {
            request.model = self.fallback_model.clone();
        }
        request.validate()?;
        ChatCompletionRequest::from_model_request(request)
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let wire_request = self.lower(request)?;
            let auth = resolve_openai_auth(&self.credentials)?;

            let reply = execute_with_retry(
                self.id(),
                "complete",
                &self.retry_policy,
                self.hooks.as_ref(),
                |_attempt| self.transport.complete(wire_request.clone(), auth.clone()),
                Delay::new,
            )
            .await?;

            reply.into_model_response()
        })
    }
}
