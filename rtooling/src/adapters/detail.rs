use std::sync::Arc;

use rresource::Mailbox;

use super::detail_payload;
use crate::{
    ParameterSpec, ParameterType, Parameters, ToolAdapter, ToolDescriptor, ToolError,
    ToolExecutionContext, ToolFuture, ToolResult, required_string,
};

/// Fetches one full message, including body text and attachment previews.
pub struct EmailDetailAdapter {
    descriptor: ToolDescriptor,
    mailbox: Arc<dyn Mailbox>,
}

impl EmailDetailAdapter {
    pub const NAME: &'static str = "get_email_full";

    pub fn new(mailbox: Arc<dyn Mailbox>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                Self::NAME,
                "Fetches the full content of one email by id, including body text and attachment previews.",
            )
            .parameter(ParameterSpec::required(
                "id",
                ParameterType::String,
                "Message id as returned by get_unread_emails or search_emails.",
            )),
            mailbox,
        }
    }
}

impl ToolAdapter for EmailDetailAdapter {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn execute<'a>(
        &'a self,
        parameters: Parameters,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult> {
        Box::pin(async move {
            let id = match required_string(&parameters, "id") {
                Ok(id) => id,
                Err(error) => return ToolResult::Failure(error.with_tool_name(Self::NAME)),
            };

            match self.mailbox.get(&id).await {
                Ok(detail) => ToolResult::Success(detail_payload(detail)),
                Err(error) => ToolResult::Failure(ToolError::from(error).with_tool_name(Self::NAME)),
            }
        })
    }
}
