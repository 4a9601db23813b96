//! Validate, execute and normalize every tool call.
//!
//! ```rust
//! use rdispatch::DispatchServer;
//! use rtooling::{ToolDescriptor, ToolSet};
//! use serde_json::json;
//!
//! let mut tools = ToolSet::new();
//! tools
//!     .register_fn(ToolDescriptor::new("ping", "Replies pong"), |_params, _ctx| async {
//!         Ok(json!("pong"))
//!     })
//!     .expect("fresh tool name");
//!
//! let server = DispatchServer::new(tools);
//! assert!(server.registry().contains("ping"));
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rtooling::{
    Envelope, NoopToolRuntimeHooks, Parameters, ToolAdapter, ToolCallRequest, ToolDispatcher,
    ToolError, ToolExecutionContext, ToolFuture, ToolRegistry, ToolResult, ToolRuntimeHooks,
    ToolSet, execute_with_timeout,
};
use tracing::Instrument;

use crate::DispatchConfig;

/// Holds no per-call state; clones share the same tool set.
#[derive(Clone)]
pub struct DispatchServer {
    tools: Arc<ToolSet>,
    config: DispatchConfig,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl std::fmt::Debug for DispatchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchServer")
            .field("tools", &self.tools)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DispatchServer {
    pub fn new(tools: ToolSet) -> Self {
        Self {
            tools: Arc::new(tools),
            config: DispatchConfig::default(),
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        self.tools.registry()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn handle(
        &self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> Envelope {
        let span = tracing::info_span!(
            "tool_call",
            tool_name = %request.tool_name,
            session_id = %context.session_id,
        );

        async move {
            match self.resolve(&request) {
                Ok((adapter, parameters)) => self.run(adapter, parameters, request, context).await,
                Err(error) => {
                    tracing::info!(
                        event = "rejected",
                        error_kind = %error.kind,
                        "{}",
                        error.message
                    );
                    self.hooks.on_call_rejected(&request, &context, &error);
                    Envelope::from(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Registry lookup and validation. Nothing executes unless both pass.
    fn resolve(
        &self,
        request: &ToolCallRequest,
    ) -> Result<(Arc<dyn ToolAdapter>, Parameters), ToolError> {
        let registry = self.tools.registry();
        let descriptor = registry
            .lookup(&request.tool_name)
            .map_err(|error| tag(ToolError::from(error), request))?;
        let adapter = self.tools.adapter(&descriptor.name).ok_or_else(|| {
            tag(
                ToolError::internal(format!("no adapter bound to '{}'", descriptor.name)),
                request,
            )
        })?;

        let validation = panic::catch_unwind(AssertUnwindSafe(|| {
            adapter.validate(&request.parameters)
        }))
        .map_err(|_| {
            tracing::error!(event = "panicked", "tool validation panicked");
            tag(ToolError::internal("tool validation panicked"), request)
        })?;

        validation
            .into_result()
            .map(|parameters| (adapter, parameters))
            .map_err(|error| tag(error, request))
    }

    async fn run(
        &self,
        adapter: Arc<dyn ToolAdapter>,
        parameters: Parameters,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> Envelope {
        let started = Instant::now();
        self.hooks.on_execution_start(&request, &context);

        let mut attempt = 1;
        let result = loop {
            let result = self
                .execute_isolated(Arc::clone(&adapter), parameters.clone(), context.clone())
                .await;

            if result.is_retryable_failure() && self.config.retry.should_retry(attempt, true) {
                let backoff = self.config.retry.backoff_for_attempt(attempt);
                tracing::debug!(
                    event = "retry",
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying transient tool failure"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            break result;
        };

        let elapsed = started.elapsed();
        match result {
            ToolResult::Success(payload) => {
                tracing::info!(
                    event = "succeeded",
                    elapsed_ms = elapsed.as_millis() as u64,
                    "tool call succeeded"
                );
                self.hooks
                    .on_execution_success(&request, &context, &payload, elapsed);
                Envelope::success(payload)
            }
            ToolResult::Failure(error) => {
                let error = tag(error, &request);
                tracing::info!(
                    event = "failed",
                    error_kind = %error.kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "{}",
                    error.message
                );
                self.hooks
                    .on_execution_failure(&request, &context, &error, elapsed);
                Envelope::from(error)
            }
        }
    }

    /// Runs one attempt on its own task so a panicking or slow adapter cannot
    /// take the caller down with it.
    async fn execute_isolated(
        &self,
        adapter: Arc<dyn ToolAdapter>,
        parameters: Parameters,
        context: ToolExecutionContext,
    ) -> ToolResult {
        let limit = self.config.call_timeout;
        let task = tokio::spawn(
            async move {
                let name = adapter.descriptor().name;
                execute_with_timeout(&name, limit, adapter.execute(parameters, &context)).await
            }
            .in_current_span(),
        );

        match task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                tracing::error!(event = "panicked", "tool adapter panicked");
                ToolResult::Failure(ToolError::internal("tool execution panicked"))
            }
            Err(join_error) => ToolResult::Failure(ToolError::internal(format!(
                "tool execution aborted: {join_error}"
            ))),
        }
    }
}

impl ToolDispatcher for DispatchServer {
    fn dispatch<'a>(
        &'a self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Envelope> {
        Box::pin(self.handle(request, context))
    }
}

fn tag(mut error: ToolError, request: &ToolCallRequest) -> ToolError {
    if error.tool_name.is_none() {
        error.tool_name = Some(request.tool_name.clone());
    }
    if let Some(call_id) = &request.call_id {
        error.tool_call_id = Some(call_id.clone());
    }
    error
}
