use std::sync::Arc;

use rresource::{MailFilter, Mailbox};

use super::{ListLimits, items_payload};
use crate::{
    Parameters, ToolAdapter, ToolDescriptor, ToolError, ToolExecutionContext, ToolFuture,
    ToolResult,
};

/// Lists unread messages as summary records.
pub struct UnreadEmailsAdapter {
    descriptor: ToolDescriptor,
    mailbox: Arc<dyn Mailbox>,
    limits: ListLimits,
}

impl UnreadEmailsAdapter {
    pub const NAME: &'static str = "get_unread_emails";

    pub fn new(mailbox: Arc<dyn Mailbox>) -> Self {
        Self::with_limits(mailbox, ListLimits::UNREAD)
    }

    pub fn with_limits(mailbox: Arc<dyn Mailbox>, limits: ListLimits) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                Self::NAME,
                "Lists unread emails with sender, recipient, subject, date and a short snippet.",
            )
            .parameter(limits.parameter()),
            mailbox,
            limits,
        }
    }
}

impl ToolAdapter for UnreadEmailsAdapter {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn execute<'a>(
        &'a self,
        parameters: Parameters,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult> {
        Box::pin(async move {
            let limit = self.limits.resolve(&parameters);
            if limit == 0 {
                return ToolResult::Success(items_payload(Vec::new()));
            }

            match self.mailbox.list(&MailFilter::Unread, limit).await {
                Ok(mut summaries) => {
                    summaries.truncate(limit);
                    ToolResult::Success(items_payload(summaries))
                }
                Err(error) => ToolResult::Failure(ToolError::from(error).with_tool_name(Self::NAME)),
            }
        })
    }
}
