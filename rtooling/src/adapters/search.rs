use std::sync::Arc;

use rresource::Mailbox;

use super::{ListLimits, items_payload};
use crate::{
    ParameterSpec, ParameterType, Parameters, ToolAdapter, ToolDescriptor, ToolError,
    ToolExecutionContext, ToolFuture, ToolResult, required_string,
};

/// Searches the mailbox with a query passed through verbatim.
pub struct SearchEmailsAdapter {
    descriptor: ToolDescriptor,
    mailbox: Arc<dyn Mailbox>,
    limits: ListLimits,
}

impl SearchEmailsAdapter {
    pub const NAME: &'static str = "search_emails";

    pub fn new(mailbox: Arc<dyn Mailbox>) -> Self {
        Self::with_limits(mailbox, ListLimits::SEARCH)
    }

    pub fn with_limits(mailbox: Arc<dyn Mailbox>, limits: ListLimits) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                Self::NAME,
                "Searches the mailbox using Gmail query syntax (e.g. from:alice@example.com, subject:invoice, is:unread) and returns matching message summaries.",
            )
            .parameter(ParameterSpec::required(
                "query",
                ParameterType::String,
                "Mailbox search query.",
            ))
            .parameter(limits.parameter()),
            mailbox,
            limits,
        }
    }
}

impl ToolAdapter for SearchEmailsAdapter {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn execute<'a>(
        &'a self,
        parameters: Parameters,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult> {
        Box::pin(async move {
            let query = match required_string(&parameters, "query") {
                Ok(query) => query,
                Err(error) => return ToolResult::Failure(error.with_tool_name(Self::NAME)),
            };
            let limit = self.limits.resolve(&parameters);
            if limit == 0 {
                return ToolResult::Success(items_payload(Vec::new()));
            }

            match self.mailbox.search(&query, limit).await {
                Ok(mut summaries) => {
                    summaries.truncate(limit);
                    ToolResult::Success(items_payload(summaries))
                }
                Err(error) => ToolResult::Failure(ToolError::from(error).with_tool_name(Self::NAME)),
            }
        })
    }
}
