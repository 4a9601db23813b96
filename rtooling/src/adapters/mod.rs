//! Concrete adapters for the default tool catalog.
//!
//! Each adapter owns its descriptor and a handle to its backing resource, and
//! remaps [`ResourceError`]s into the tool failure taxonomy.

mod detail;
mod headcount;
mod search;
mod unread;

use rresource::{MessageDetail, MessageSummary, ResourceError, ResourceErrorKind};
use serde_json::{Value, json};

use crate::{ParameterSpec, ParameterType, Parameters, ToolError};

pub use detail::EmailDetailAdapter;
pub use headcount::EmployeeCountAdapter;
pub use search::SearchEmailsAdapter;
pub use unread::UnreadEmailsAdapter;

/// Default and ceiling for an adapter's `max_results` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub default_max_results: u32,
    pub upper_bound: u32,
}

impl ListLimits {
    pub const UNREAD: Self = Self {
        default_max_results: 5,
        upper_bound: 50,
    };

    pub const SEARCH: Self = Self {
        default_max_results: 10,
        upper_bound: 50,
    };

    fn parameter(&self) -> ParameterSpec {
        ParameterSpec::optional(
            "max_results",
            ParameterType::Integer,
            format!(
                "Maximum number of messages to return (default {}, at most {}).",
                self.default_max_results, self.upper_bound
            ),
        )
        .with_default(json!(self.default_max_results))
        .with_minimum(0)
        .clamped_to(i64::from(self.upper_bound))
    }

    /// Reads `max_results`, falling back to the default and clamping into range.
    fn resolve(&self, parameters: &Parameters) -> usize {
        let requested = parameters
            .get("max_results")
            .and_then(Value::as_i64)
            .unwrap_or(i64::from(self.default_max_results));
        requested.clamp(0, i64::from(self.upper_bound)) as usize
    }
}

impl From<ResourceError> for ToolError {
    fn from(error: ResourceError) -> Self {
        let kind = match error.kind {
            ResourceErrorKind::NotFound => crate::ToolErrorKind::NotFound,
            ResourceErrorKind::Unauthorized => crate::ToolErrorKind::Unauthorized,
            ResourceErrorKind::Timeout => crate::ToolErrorKind::Timeout,
            ResourceErrorKind::RateLimited
            | ResourceErrorKind::Unavailable
            | ResourceErrorKind::Malformed
            | ResourceErrorKind::Other => crate::ToolErrorKind::Internal,
        };

        ToolError::new(kind, error.message, error.retryable)
    }
}

fn summary_item(summary: MessageSummary) -> Value {
    json!({
        "id": summary.id,
        "metadata": {
            "thread_id": summary.thread_id,
            "headers": summary.headers,
        },
        "preview": summary.snippet,
    })
}

pub(crate) fn items_payload(summaries: Vec<MessageSummary>) -> Value {
    let items: Vec<Value> = summaries.into_iter().map(summary_item).collect();
    json!({
        "count": items.len(),
        "items": items,
    })
}

pub(crate) fn detail_payload(detail: MessageDetail) -> Value {
    json!({
        "id": detail.id,
        "metadata": {
            "thread_id": detail.thread_id,
            "headers": detail.headers,
            "snippet": detail.snippet,
        },
        "body": detail.body,
        "attachments": detail.attachments,
    })
}
