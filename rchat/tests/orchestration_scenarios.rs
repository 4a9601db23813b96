use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rchat::{
    OrchestrationErrorKind, OrchestrationPolicy, Orchestrator, SessionState, TurnRole,
};
use rdispatch::{DispatchServer, HttpDispatchClient, spawn_server};
use rprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    ProviderFuture, ProviderId, Role, StopReason, TokenUsage, ToolCall,
};
use rresource::{
    InMemoryMailbox, MailFilter, Mailbox, MessageDetail, MessageSummary, ResourceError,
    ResourceFuture, StaticHeadcount,
};
use rtooling::adapters::{
    EmailDetailAdapter, EmployeeCountAdapter, SearchEmailsAdapter, UnreadEmailsAdapter,
};
use rtooling::{
    Envelope, ToolCallRequest, ToolDispatcher, ToolErrorKind, ToolExecutionContext, ToolFuture,
    ToolRegistry, ToolSet,
};
use serde_json::json;

type Reply = Box<dyn Fn(&ModelRequest) -> Result<ModelResponse, ProviderError> + Send + Sync>;

/// Replays scripted replies in order and records every request it sees.
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self::default()
    }

    fn then(
        self,
        reply: impl Fn(&ModelRequest) -> Result<ModelResponse, ProviderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(Box::new(reply));
        self
    }

    fn then_call(self, name: &'static str, arguments: &'static str) -> Self {
        self.then(move |_| Ok(response(vec![tool_call(name, arguments)])))
    }

    fn then_text(self, text: &'static str) -> Self {
        self.then(move |_| Ok(text_response(text)))
    }

    /// Answers with the content of the most recent tool output message.
    fn then_echo_tool_output(self) -> Self {
        self.then(|request| {
            let tool_output = request
                .messages
                .iter()
                .rev()
                .find(|message| message.content.starts_with("Tool ("))
                .map(|message| message.content.clone())
                .unwrap_or_default();
            Ok(text_response(&format!("Summary: {tool_output}")))
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let reply = self.replies.lock().expect("replies lock").pop_front();
            let result = match &reply {
                Some(reply) => reply(&request),
                None => Err(ProviderError::other("script exhausted")),
            };
            self.requests.lock().expect("requests lock").push(request);
            result
        })
    }
}

fn response(output: Vec<OutputItem>) -> ModelResponse {
    ModelResponse {
        provider: ProviderId::OpenAi,
        model: "gpt-4o-mini".to_string(),
        output,
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

fn text_response(text: &str) -> ModelResponse {
    response(vec![OutputItem::Message(Message::new(Role::Assistant, text))])
}

fn tool_call(name: &str, arguments: &str) -> OutputItem {
    OutputItem::ToolCall(ToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: arguments.to_string(),
    })
}

fn tool_set(mailbox: Arc<dyn Mailbox>) -> ToolSet {
    let mut tools = ToolSet::new();
    tools
        .register(EmployeeCountAdapter::new(Arc::new(StaticHeadcount(120))))
        .expect("register count");
    tools
        .register(UnreadEmailsAdapter::new(Arc::clone(&mailbox)))
        .expect("register unread");
    tools
        .register(SearchEmailsAdapter::new(Arc::clone(&mailbox)))
        .expect("register search");
    tools
        .register(EmailDetailAdapter::new(mailbox))
        .expect("register detail");
    tools
}

fn orchestrator(
    provider: Arc<ScriptedProvider>,
    mailbox: Arc<dyn Mailbox>,
    policy: OrchestrationPolicy,
) -> Orchestrator {
    let server = DispatchServer::new(tool_set(mailbox));
    let registry = server.registry();
    Orchestrator::builder(provider, Arc::new(server), registry)
        .policy(policy)
        .build()
        .expect("orchestrator builds")
}

fn demo_mailbox() -> Arc<dyn Mailbox> {
    Arc::new(InMemoryMailbox::demo())
}

struct RevokedMailbox;

impl Mailbox for RevokedMailbox {
    fn list<'a>(
        &'a self,
        _filter: &'a MailFilter,
        _limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async { Err(ResourceError::unauthorized("mail access token was revoked")) })
    }

    fn search<'a>(
        &'a self,
        _query: &'a str,
        _limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async { Err(ResourceError::unauthorized("mail access token was revoked")) })
    }

    fn get<'a>(
        &'a self,
        _id: &'a str,
    ) -> ResourceFuture<'a, Result<MessageDetail, ResourceError>> {
        Box::pin(async { Err(ResourceError::unauthorized("mail access token was revoked")) })
    }
}

#[derive(Default)]
struct CountingDispatcher {
    calls: AtomicUsize,
}

impl ToolDispatcher for CountingDispatcher {
    fn dispatch<'a>(
        &'a self,
        _request: ToolCallRequest,
        _context: ToolExecutionContext,
    ) -> ToolFuture<'a, Envelope> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Envelope::success(json!({}))
        })
    }
}

#[tokio::test]
async fn employee_count_question_is_answered_from_tool_output() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("get_employee_count", "{}")
            .then_echo_tool_output(),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default(),
    );

    let outcome = orchestrator
        .answer("How many employees are in the company?")
        .await
        .expect("orchestration succeeds");

    assert!(outcome.answer.contains("120"));
    assert_eq!(outcome.tool_calls(), 1);
    assert_eq!(
        outcome.last_envelope,
        Some(Envelope::success(json!({"count": 120})))
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let offered: Vec<_> = requests[0].tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(
        offered,
        vec![
            "get_employee_count",
            "get_unread_emails",
            "search_emails",
            "get_email_full"
        ]
    );
    assert!(requests[1].tools.is_empty());

    let roles: Vec<_> = outcome.transcript.turns().iter().map(|turn| turn.role).collect();
    assert_eq!(
        roles,
        vec![TurnRole::User, TurnRole::Model, TurnRole::Tool, TurnRole::Model]
    );
}

#[tokio::test]
async fn unread_question_reports_only_unread_messages() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("get_unread_emails", r#"{"max_results":5}"#)
            .then_echo_tool_output(),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default(),
    );

    let outcome = orchestrator
        .answer("Do I have unread emails?")
        .await
        .expect("orchestration succeeds");

    let data = outcome
        .last_envelope
        .as_ref()
        .and_then(Envelope::data)
        .expect("success payload");
    assert_eq!(data["count"], json!(2));
    assert!(outcome.answer.contains("demo-1"));
    assert!(outcome.answer.contains("demo-2"));
    assert!(!outcome.answer.contains("demo-3"));
}

#[tokio::test]
async fn search_then_detail_uses_two_hops_when_allowed() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("search_emails", r#"{"query":"from:alice@example.com"}"#)
            .then_call("get_email_full", r#"{"id":"demo-1"}"#)
            .then_echo_tool_output(),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default().with_max_tool_hops(2),
    );

    let outcome = orchestrator
        .answer("What did Alice send me about planning?")
        .await
        .expect("orchestration succeeds");

    assert_eq!(outcome.tool_calls(), 2);
    assert!(outcome.answer.contains("planning.txt"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].tools.len(), 4);
    assert!(requests[2].tools.is_empty());
}

#[tokio::test]
async fn unauthorized_failure_is_explained_not_raised() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("get_unread_emails", "{}")
            .then_echo_tool_output(),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        Arc::new(RevokedMailbox),
        OrchestrationPolicy::default(),
    );

    let outcome = orchestrator
        .answer("Do I have unread emails?")
        .await
        .expect("failure envelopes still produce an answer");

    assert_eq!(
        outcome.last_envelope.as_ref().and_then(Envelope::error_kind),
        Some(ToolErrorKind::Unauthorized)
    );
    assert!(outcome.answer.contains("Unauthorized"));
    assert!(outcome.answer.contains("mail access token was revoked"));

    let summary_request = &provider.requests()[1];
    assert!(
        summary_request
            .messages
            .iter()
            .any(|message| message.content.contains("\"status\": \"error\""))
    );
}

#[tokio::test]
async fn direct_answer_skips_dispatch() {
    let provider = Arc::new(ScriptedProvider::new().then_text("Hello! How can I help?"));
    let dispatcher = Arc::new(CountingDispatcher::default());
    let orchestrator = Orchestrator::builder(
        provider.clone(),
        dispatcher.clone(),
        Arc::new(ToolRegistry::new()),
    )
    .build()
    .expect("orchestrator builds");

    let outcome = orchestrator.answer("hi").await.expect("direct answer");

    assert_eq!(outcome.answer, "Hello! How can I help?");
    assert_eq!(outcome.tool_calls(), 0);
    assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn protocol_error_is_retried_once_with_correction() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then(|_| {
                Ok(response(vec![
                    tool_call("get_unread_emails", "{}"),
                    tool_call("get_employee_count", "{}"),
                ]))
            })
            .then_text("You have two unread emails."),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default(),
    );

    let outcome = orchestrator
        .answer("Unread?")
        .await
        .expect("second attempt succeeds");
    assert_eq!(outcome.answer, "You have two unread emails.");

    let retry = &provider.requests()[1];
    let correction = retry.messages.last().expect("correction message");
    assert_eq!(correction.role, Role::System);
    assert!(correction.content.contains("2 tool calls"));
}

#[tokio::test]
async fn repeated_protocol_errors_surface_as_model_protocol() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then(|_| Ok(response(Vec::new())))
            .then_call("search_emails", "not json"),
    );
    let dispatcher = Arc::new(CountingDispatcher::default());
    let orchestrator = Orchestrator::builder(
        provider.clone(),
        dispatcher.clone(),
        Arc::new(ToolRegistry::new()),
    )
    .build()
    .expect("orchestrator builds");

    let error = orchestrator
        .answer("search my mail")
        .await
        .expect_err("protocol error after retry");

    assert_eq!(error.kind, OrchestrationErrorKind::ModelProtocol);
    assert_eq!(error.state, SessionState::AwaitingDecision);
    assert_eq!(provider.requests().len(), 2);
    assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_query_is_rejected_without_model_calls() {
    let provider = Arc::new(ScriptedProvider::new());
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default(),
    );

    let error = orchestrator.answer("   ").await.expect_err("blank query");

    assert_eq!(error.kind, OrchestrationErrorKind::InvalidRequest);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn unreachable_summarization_returns_last_envelope() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("get_employee_count", "{}")
            .then(|_| Err(ProviderError::unavailable("model service down"))),
    );
    let orchestrator = orchestrator(
        Arc::clone(&provider),
        demo_mailbox(),
        OrchestrationPolicy::default(),
    );

    let error = orchestrator
        .answer("How many employees?")
        .await
        .expect_err("summary fails");

    assert_eq!(error.kind, OrchestrationErrorKind::Provider);
    assert_eq!(error.state, SessionState::Summarizing);
    assert_eq!(
        error.envelope,
        Some(Envelope::success(json!({"count": 120})))
    );
}

#[tokio::test]
async fn remote_dispatch_serves_the_same_session() {
    let mut running = spawn_server(
        DispatchServer::new(tool_set(demo_mailbox())),
        SocketAddr::from(([127, 0, 0, 1], 0)),
    )
    .await
    .expect("server binds");
    let client = HttpDispatchClient::new(running.base_url());
    let registry = Arc::new(client.fetch_registry().await.expect("catalog"));

    let provider = Arc::new(
        ScriptedProvider::new()
            .then_call("get_employee_count", "")
            .then_echo_tool_output(),
    );
    let orchestrator = Orchestrator::builder(provider, Arc::new(client), registry)
        .build()
        .expect("orchestrator builds");

    let outcome = orchestrator
        .answer("How many employees are in the company?")
        .await
        .expect("orchestration succeeds");

    assert!(outcome.answer.contains("120"));
    running.shutdown();
}
