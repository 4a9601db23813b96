//! Adapter tests against a scripted transport.

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::{
    Message, ModelProvider, ModelRequest, OutputItem, ProviderError, ProviderErrorKind,
    ProviderFuture, RetryPolicy, Role, SecureCredentialManager, StopReason, ToolDefinition,
};

use super::auth::OpenAiAuth;
use super::provider::OpenAiProvider;
use super::transport::{OpenAiHttpTransport, OpenAiTransport};
use super::wire::{ChatCompletionReply, ChatCompletionRequest, error_message, stop_reason};

type Scripted = Result<ChatCompletionReply, ProviderError>;

#[derive(Debug, Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedTransport {
    fn with(replies: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::default(),
        })
    }

    fn seen(&self) -> Vec<ChatCompletionRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl OpenAiTransport for ScriptedTransport {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<ChatCompletionReply, ProviderError>> {
        Box::pin(async move {
            assert_eq!(auth.bearer_token(), "sk-relay-test");
            self.seen.lock().expect("seen lock").push(request);
            self.replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("script exhausted")))
        })
    }
}

fn reply(body: serde_json::Value) -> ChatCompletionReply {
    serde_json::from_value(body).expect("reply fixture parses")
}

fn headcount_call() -> ChatCompletionReply {
    reply(json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_employee_count", "arguments": "{}"}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 7, "total_tokens": 47}
    }))
}

fn credentials() -> Arc<SecureCredentialManager> {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-relay-test")
        .expect("key should set");
    credentials
}

fn quick_retries(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        backoff_multiplier: 1.0,
    }
}

fn catalog_entry(name: &str, schema: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: format!("{name} tool"),
        input_schema: schema.to_string(),
    }
}

#[test]
fn blank_model_falls_back_before_validation() {
    let provider = OpenAiProvider::new(credentials(), ScriptedTransport::with(Vec::new()))
        .with_fallback_model("gpt-relay");
    let request = ModelRequest::new(
        " ",
        vec![
            Message::new(Role::System, "pick one tool"),
            Message::new(Role::User, "how many people work here?"),
        ],
    );

    let lowered = provider.lower(request).expect("fallback model applies");
    assert_eq!(lowered.model, "gpt-relay");
    assert_eq!(lowered.messages[0].role, "system");
    assert_eq!(lowered.messages[1].role, "user");
}

#[test]
fn offered_tools_serialize_as_functions_without_parallel_calls() {
    let request = ModelRequest::new("gpt-4o-mini", vec![Message::new(Role::User, "unread?")])
        .with_tools(vec![catalog_entry(
            "get_unread_emails",
            r#"{"type":"object","properties":{"max_results":{"type":"integer"}}}"#,
        )]);

    let lowered = ChatCompletionRequest::from_model_request(request).expect("lowers");
    let body = serde_json::to_value(&lowered).expect("serializes");

    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "get_unread_emails");
    assert_eq!(
        body["tools"][0]["function"]["parameters"]["properties"]["max_results"]["type"],
        "integer"
    );
    assert_eq!(body["parallel_tool_calls"], false);
    assert!(body.get("temperature").is_none());
}

#[test]
fn summary_requests_omit_tool_fields() {
    let request = ModelRequest::new("gpt-4o-mini", vec![Message::new(Role::User, "summarize")]);
    let body = serde_json::to_value(
        ChatCompletionRequest::from_model_request(request).expect("lowers"),
    )
    .expect("serializes");

    assert!(body.get("tools").is_none());
    assert!(body.get("parallel_tool_calls").is_none());
}

#[test]
fn non_object_schemas_are_rejected() {
    for schema in ["{not json", "[]"] {
        let request = ModelRequest::new("gpt-4o-mini", vec![Message::new(Role::User, "hi")])
            .with_tools(vec![catalog_entry("search_emails", schema)]);

        let error = ChatCompletionRequest::from_model_request(request).expect_err("bad schema");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
        assert!(error.message.contains("search_emails"));
    }
}

#[test]
fn blank_message_content_is_rejected_with_its_position() {
    let request = ModelRequest::new(
        "gpt-4o-mini",
        vec![Message::new(Role::User, "hi"), Message::new(Role::Assistant, "  ")],
    );

    let error = ChatCompletionRequest::from_model_request(request).expect_err("blank content");
    assert!(error.message.contains("message 1"));
}

#[test]
fn replies_lift_into_text_and_tool_calls() {
    let response = headcount_call().into_model_response().expect("lifts");

    assert_eq!(response.stop_reason, StopReason::ToolUse);
    assert_eq!(response.usage.total_tokens, 47);
    assert_eq!(response.output.len(), 1);
    assert!(matches!(
        &response.output[0],
        OutputItem::ToolCall(call) if call.id == "call_1" && call.arguments == "{}"
    ));

    let text = reply(json!({
        "model": "gpt-4o-mini",
        "choices": [{"message": {"content": "There are 120 employees."}, "finish_reason": "stop"}]
    }))
    .into_model_response()
    .expect("lifts");
    assert_eq!(text.text(), "There are 120 employees.");
    assert_eq!(text.usage.total_tokens, 0);
}

#[test]
fn replies_without_choices_are_transport_errors() {
    let error = reply(json!({"model": "gpt-4o-mini", "choices": []}))
        .into_model_response()
        .expect_err("no choices");
    assert_eq!(error.kind, ProviderErrorKind::Transport);
}

#[test]
fn finish_reasons_map_onto_stop_reasons() {
    assert_eq!(stop_reason(Some("stop")), StopReason::EndTurn);
    assert_eq!(stop_reason(Some("length")), StopReason::MaxTokens);
    assert_eq!(stop_reason(Some("function_call")), StopReason::ToolUse);
    assert_eq!(stop_reason(Some("content_filter")), StopReason::Cancelled);
    assert_eq!(stop_reason(None), StopReason::Other);
}

#[test]
fn error_bodies_yield_messages_in_both_shapes() {
    assert_eq!(
        error_message(r#"{"error":{"message":"Incorrect API key provided","type":"auth"}}"#),
        Some("Incorrect API key provided".to_string())
    );
    assert_eq!(
        error_message(r#"{"error":"upstream model offline"}"#),
        Some("upstream model offline".to_string())
    );
    assert_eq!(error_message("<html>bad gateway</html>"), None);
}

#[test]
fn completions_url_tolerates_trailing_slash() {
    let transport = OpenAiHttpTransport::new(reqwest::Client::new())
        .with_base_url("http://127.0.0.1:4000/v1/");
    assert_eq!(
        transport.completions_url(),
        "http://127.0.0.1:4000/v1/chat/completions"
    );
}

#[tokio::test]
async fn complete_retries_rate_limits_then_succeeds() {
    let transport = ScriptedTransport::with(vec![
        Err(ProviderError::from_status(429, "slow down")),
        Ok(headcount_call()),
    ]);
    let provider =
        OpenAiProvider::new(credentials(), transport.clone()).with_retry_policy(quick_retries(3));

    let response = provider
        .complete(ModelRequest::new(
            "gpt-4o-mini",
            vec![Message::new(Role::User, "how many employees?")],
        ))
        .await
        .expect("second attempt succeeds");

    assert_eq!(transport.seen().len(), 2);
    assert_eq!(response.tool_calls()[0].name, "get_employee_count");
}

#[tokio::test]
async fn complete_does_not_retry_rejected_credentials() {
    let transport = ScriptedTransport::with(vec![Err(ProviderError::from_status(
        401,
        "Incorrect API key provided",
    ))]);
    let provider =
        OpenAiProvider::new(credentials(), transport.clone()).with_retry_policy(quick_retries(3));

    let error = provider
        .complete(ModelRequest::new(
            "gpt-4o-mini",
            vec![Message::new(Role::User, "hi")],
        ))
        .await
        .expect_err("401 is final");

    assert!(error.is_credential_failure());
    assert_eq!(error.status, Some(401));
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn complete_requires_api_key() {
    let provider = OpenAiProvider::new(
        Arc::new(SecureCredentialManager::new()),
        ScriptedTransport::with(Vec::new()),
    );

    let error = provider
        .complete(ModelRequest::new(
            "gpt-4o-mini",
            vec![Message::new(Role::User, "hi")],
        ))
        .await
        .expect_err("missing key should fail");

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
}

#[test]
fn openai_keys_are_format_checked() {
    let credentials = SecureCredentialManager::new();
    assert!(credentials.set_openai_api_key("gateway-token").is_err());
    assert!(credentials.set_openai_api_key("sk-has space").is_err());
    assert!(credentials.set_openai_api_key("sk-relay-test").is_ok());
}

#[test]
fn auth_debug_output_is_redacted() {
    let auth = OpenAiAuth::ApiKey(crate::SecretString::new("sk-relay-test"));
    assert_eq!(format!("{auth:?}"), "OpenAiAuth::ApiKey([REDACTED])");
}
