use crate::{Envelope, ToolCallRequest, ToolExecutionContext, ToolFuture};

/// Anything that accepts tool call requests and answers with an [`Envelope`].
///
/// Implementations never fail outside the envelope: transport and internal
/// faults come back as error envelopes.
pub trait ToolDispatcher: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        request: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Envelope>;
}
