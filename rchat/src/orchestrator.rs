//! Orchestration client: drives one query through decide, dispatch and
//! summarize.
//!
//! The orchestrator never talks to a resource directly. It sees the tool
//! catalog as descriptors and hands every tool call to a [`ToolDispatcher`],
//! which may be in-process or remote.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rcommon::SessionId;
use rprovider::{Message, ModelProvider, ModelRequest, ModelResponse, Role, ToolDefinition};
use rtooling::{
    Envelope, ToolCallRequest, ToolDispatcher, ToolExecutionContext, ToolRegistry,
};

use crate::{
    ConversationTurn, Decision, NoopOrchestrationHooks, OrchestrationError,
    OrchestrationErrorKind, OrchestrationHooks, OrchestrationPolicy, OrchestrationSession,
    SessionState, Transcript, parse_decision, render_messages,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationOutcome {
    pub session_id: SessionId,
    pub answer: String,
    pub transcript: Transcript,
    /// Envelope of the last dispatch, if any tool ran.
    pub last_envelope: Option<Envelope>,
}

impl OrchestrationOutcome {
    pub fn tool_calls(&self) -> usize {
        self.transcript.tool_calls()
    }
}

pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    dispatcher: Arc<dyn ToolDispatcher>,
    registry: Arc<ToolRegistry>,
    model: String,
    policy: OrchestrationPolicy,
    hooks: Arc<dyn OrchestrationHooks>,
    next_session: AtomicU64,
}

impl Orchestrator {
    pub fn builder(
        provider: Arc<dyn ModelProvider>,
        dispatcher: Arc<dyn ToolDispatcher>,
        registry: Arc<ToolRegistry>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder::new(provider, dispatcher, registry)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &OrchestrationPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn answer(&self, query: &str) -> Result<OrchestrationOutcome, OrchestrationError> {
        let sequence = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        self.answer_in_session(SessionId::new(format!("session-{sequence}")), query)
            .await
    }

    pub async fn answer_in_session(
        &self,
        session_id: SessionId,
        query: &str,
    ) -> Result<OrchestrationOutcome, OrchestrationError> {
        let started = Instant::now();
        self.hooks.on_session_start(&session_id, query);

        let session =
            OrchestrationSession::start(session_id.clone(), Arc::clone(&self.registry), query);
        let result = match session {
            Ok(session) => self.run(session).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(outcome) => self.hooks.on_session_complete(
                &session_id,
                outcome.tool_calls() as u32,
                started.elapsed(),
            ),
            Err(error) => self
                .hooks
                .on_session_failure(&session_id, error, started.elapsed()),
        }

        result
    }

    async fn run(
        &self,
        mut session: OrchestrationSession,
    ) -> Result<OrchestrationOutcome, OrchestrationError> {
        let mut pending: Option<ToolCallRequest> = None;
        let mut last_envelope: Option<Envelope> = None;
        let mut answer = String::new();

        loop {
            match session.state() {
                SessionState::AwaitingDecision => {
                    let offer_tools = session.tool_hops() < self.policy.max_tool_hops;
                    let decision = self
                        .decide(&session, offer_tools)
                        .await
                        .map_err(|error| error.with_envelope(last_envelope.clone()))?;
                    self.hooks.on_decision(session.id(), &decision);

                    match decision {
                        Decision::DirectAnswer(text) => {
                            session.record(ConversationTurn::model_text(text.clone()));
                            answer = text;
                            self.advance(&mut session, SessionState::Done)?;
                        }
                        Decision::ToolCallIntent {
                            name,
                            parameters,
                            call_id,
                        } => {
                            session.record(ConversationTurn::tool_intent(&name, &parameters));
                            let mut request = ToolCallRequest::new(name, parameters);
                            if let Some(call_id) = call_id {
                                request = request.with_call_id(call_id);
                            }
                            pending = Some(request);
                            self.advance(&mut session, SessionState::Dispatching)?;
                        }
                    }
                }
                SessionState::Dispatching => {
                    let Some(request) = pending.take() else {
                        return Err(OrchestrationError::model_protocol(
                            "no tool call pending for dispatch",
                            SessionState::Dispatching,
                        ));
                    };
                    let tool_name = request.tool_name.clone();
                    let context = ToolExecutionContext::new(session.id().clone());
                    let envelope = self.dispatcher.dispatch(request, context).await;

                    session.record(ConversationTurn::tool_result(tool_name, &envelope));
                    last_envelope = Some(envelope);
                    self.advance(&mut session, SessionState::Summarizing)?;
                }
                SessionState::Summarizing => {
                    if session.tool_hops() < self.policy.max_tool_hops {
                        self.advance(&mut session, SessionState::AwaitingDecision)?;
                        continue;
                    }

                    let text = self
                        .summarize(&session)
                        .await
                        .map_err(|error| error.with_envelope(last_envelope.clone()))?;
                    session.record(ConversationTurn::model_text(text.clone()));
                    answer = text;
                    self.advance(&mut session, SessionState::Done)?;
                }
                SessionState::Done => break,
            }
        }

        Ok(OrchestrationOutcome {
            session_id: session.id().clone(),
            answer,
            transcript: session.into_transcript(),
            last_envelope,
        })
    }

    fn advance(
        &self,
        session: &mut OrchestrationSession,
        next: SessionState,
    ) -> Result<(), OrchestrationError> {
        let previous = session.advance(next)?;
        self.hooks.on_state_change(session.id(), previous, next);
        Ok(())
    }

    async fn decide(
        &self,
        session: &OrchestrationSession,
        offer_tools: bool,
    ) -> Result<Decision, OrchestrationError> {
        let tools = if offer_tools {
            session.catalog().definitions()
        } else {
            Vec::new()
        };
        let mut correction: Option<String> = None;
        let mut attempt = 0;

        loop {
            let mut messages = vec![Message::new(Role::System, &self.policy.decision_prompt)];
            messages.extend(render_messages(
                session.transcript(),
                self.policy.max_body_chars,
            ));
            if let Some(correction) = &correction {
                messages.push(Message::new(Role::System, correction));
            }

            let response = self
                .complete(session, messages, tools.clone(), SessionState::AwaitingDecision)
                .await?;

            match parse_decision(&response) {
                Ok(Decision::ToolCallIntent { .. }) if !offer_tools => {
                    let error = OrchestrationError::model_protocol(
                        "model requested a tool after the tool hop limit was reached",
                        SessionState::AwaitingDecision,
                    );
                    if attempt >= self.policy.decision_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    self.hooks.on_protocol_retry(session.id(), attempt, &error);
                    correction = Some(self.policy.corrective_message(&error.message));
                }
                Ok(decision) => return Ok(decision),
                Err(error) if attempt < self.policy.decision_retries => {
                    attempt += 1;
                    self.hooks.on_protocol_retry(session.id(), attempt, &error);
                    correction = Some(self.policy.corrective_message(&error.message));
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn summarize(
        &self,
        session: &OrchestrationSession,
    ) -> Result<String, OrchestrationError> {
        let mut messages = vec![Message::new(Role::System, &self.policy.summary_prompt)];
        messages.extend(render_messages(
            session.transcript(),
            self.policy.max_body_chars,
        ));

        let response = self
            .complete(session, messages, Vec::new(), SessionState::Summarizing)
            .await?;
        let text = response.text();
        let text = text.trim();
        if text.is_empty() {
            return Err(OrchestrationError::model_protocol(
                "model returned an empty summary",
                SessionState::Summarizing,
            ));
        }

        Ok(text.to_string())
    }

    async fn complete(
        &self,
        session: &OrchestrationSession,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        state: SessionState,
    ) -> Result<ModelResponse, OrchestrationError> {
        let request = ModelRequest::builder(&self.model)
            .messages(messages)
            .tools(tools)
            .options(self.policy.generation)
            .metadata("session_id", session.id().as_str())
            .metadata("state", state.as_str())
            .build()
            .map_err(|error| OrchestrationError::provider(error, state))?;

        self.provider
            .complete(request)
            .await
            .map_err(|error| OrchestrationError::provider(error, state))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.id())
            .field("model", &self.model)
            .field("tools", &self.registry.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

pub struct OrchestratorBuilder {
    provider: Arc<dyn ModelProvider>,
    dispatcher: Arc<dyn ToolDispatcher>,
    registry: Arc<ToolRegistry>,
    model: String,
    policy: OrchestrationPolicy,
    hooks: Arc<dyn OrchestrationHooks>,
}

impl OrchestratorBuilder {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(
        provider: Arc<dyn ModelProvider>,
        dispatcher: Arc<dyn ToolDispatcher>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            registry,
            model: Self::DEFAULT_MODEL.to_string(),
            policy: OrchestrationPolicy::default(),
            hooks: Arc::new(NoopOrchestrationHooks),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn policy(mut self, policy: OrchestrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn OrchestrationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Result<Orchestrator, OrchestrationError> {
        if self.model.trim().is_empty() {
            return Err(OrchestrationError::new(
                OrchestrationErrorKind::InvalidRequest,
                "model must not be empty",
                SessionState::AwaitingDecision,
            ));
        }

        Ok(Orchestrator {
            provider: self.provider,
            dispatcher: self.dispatcher,
            registry: self.registry,
            model: self.model,
            policy: self.policy,
            hooks: self.hooks,
            next_session: AtomicU64::new(0),
        })
    }
}
