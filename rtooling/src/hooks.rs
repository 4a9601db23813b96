//! Lifecycle callbacks fired by the dispatch server.
//!
//! A call that fails lookup or validation only reaches
//! [`ToolRuntimeHooks::on_call_rejected`]. Calls that pass both see
//! `on_execution_start` followed by exactly one of the success or failure
//! callbacks, after any transient retries have run.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use rtooling::{ToolCallRequest, ToolError, ToolExecutionContext, ToolRuntimeHooks};
//!
//! #[derive(Default)]
//! struct RejectionCounter(AtomicUsize);
//!
//! impl ToolRuntimeHooks for RejectionCounter {
//!     fn on_call_rejected(
//!         &self,
//!         _request: &ToolCallRequest,
//!         _context: &ToolExecutionContext,
//!         _error: &ToolError,
//!     ) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = RejectionCounter::default();
//! counter.on_call_rejected(
//!     &ToolCallRequest::new("get_weather", Default::default()),
//!     &ToolExecutionContext::new("session-1"),
//!     &ToolError::unknown_tool("get_weather"),
//! );
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use std::time::Duration;

use serde_json::Value;

use crate::{ToolCallRequest, ToolError, ToolExecutionContext};

pub trait ToolRuntimeHooks: Send + Sync {
    /// Unknown tool or invalid parameters; the adapter never ran.
    fn on_call_rejected(
        &self,
        _request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        _error: &ToolError,
    ) {
    }

    fn on_execution_start(&self, _request: &ToolCallRequest, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        _payload: &Value,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
