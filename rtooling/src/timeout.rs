use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures_timer::Delay;
use futures_util::future::{Either, select};

use crate::{ToolError, ToolResult};

/// Races `execution` against `limit`, turning an elapsed deadline into a
/// `Timeout` failure.
pub async fn execute_with_timeout<F>(tool_name: &str, limit: Duration, execution: F) -> ToolResult
where
    F: Future<Output = ToolResult>,
{
    let execution = pin!(execution);
    match select(execution, Delay::new(limit)).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => ToolResult::Failure(
            ToolError::timeout(format!(
                "tool '{tool_name}' did not finish within {}ms",
                limit.as_millis()
            ))
            .with_tool_name(tool_name),
        ),
    }
}
