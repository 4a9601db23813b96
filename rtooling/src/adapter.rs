//! Adapter capability implemented once per concrete tool.
//!
//! ```rust
//! use rtooling::{FunctionAdapter, ToolAdapter, ToolDescriptor};
//! use serde_json::json;
//!
//! let adapter = FunctionAdapter::new(
//!     ToolDescriptor::new("echo", "Echoes its parameters"),
//!     |params, _ctx| async move { Ok(json!(params)) },
//! );
//!
//! assert_eq!(adapter.descriptor().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use rcommon::BoxFuture;
use serde_json::Value;

use crate::{Parameters, ToolDescriptor, ToolError, ToolExecutionContext, ToolResult, ValidationResult};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait ToolAdapter: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    fn validate(&self, parameters: &Parameters) -> ValidationResult {
        self.descriptor().validate(parameters)
    }

    /// Runs the tool. Implementations map every failure into [`ToolResult::Failure`].
    fn execute<'a>(
        &'a self,
        parameters: Parameters,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult>;
}

type AdapterHandler = dyn Fn(Parameters, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
    + Send
    + Sync;

/// Adapter backed by a closure, for small tools and tests.
pub struct FunctionAdapter {
    descriptor: ToolDescriptor,
    handler: Arc<AdapterHandler>,
}

impl FunctionAdapter {
    pub fn new<F, Fut>(descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: Fn(Parameters, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<AdapterHandler> =
            Arc::new(move |parameters, context| Box::pin(handler(parameters, context)));

        Self {
            descriptor,
            handler,
        }
    }
}

impl ToolAdapter for FunctionAdapter {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn validate(&self, parameters: &Parameters) -> ValidationResult {
        self.descriptor.validate(parameters)
    }

    fn execute<'a>(
        &'a self,
        parameters: Parameters,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult> {
        let future = (self.handler)(parameters, context.clone());
        Box::pin(async move { ToolResult::from(future.await) })
    }
}
