use std::sync::Arc;

use rresource::HeadcountSource;
use serde_json::json;

use crate::{
    Parameters, ToolAdapter, ToolDescriptor, ToolError, ToolExecutionContext, ToolFuture,
    ToolResult,
};

pub struct EmployeeCountAdapter {
    descriptor: ToolDescriptor,
    source: Arc<dyn HeadcountSource>,
}

impl EmployeeCountAdapter {
    pub const NAME: &'static str = "get_employee_count";

    pub fn new(source: Arc<dyn HeadcountSource>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                Self::NAME,
                "Returns the total number of employees in the company.",
            ),
            source,
        }
    }
}

impl ToolAdapter for EmployeeCountAdapter {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn execute<'a>(
        &'a self,
        _parameters: Parameters,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolResult> {
        Box::pin(async move {
            match self.source.employee_count().await {
                Ok(count) => ToolResult::Success(json!({ "count": count })),
                Err(error) => ToolResult::Failure(ToolError::from(error).with_tool_name(Self::NAME)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use rresource::StaticHeadcount;

    use super::*;

    #[tokio::test]
    async fn returns_static_count() {
        let adapter = EmployeeCountAdapter::new(Arc::new(StaticHeadcount(120)));
        let result = adapter
            .execute(Parameters::new(), &ToolExecutionContext::new("s"))
            .await;
        assert_eq!(result, ToolResult::Success(json!({"count": 120})));
    }

    #[test]
    fn descriptor_declares_no_parameters() {
        let adapter = EmployeeCountAdapter::new(Arc::new(StaticHeadcount(1)));
        assert!(adapter.descriptor().parameters.is_empty());
        assert!(adapter.validate(&Parameters::new()).is_valid());
    }
}
