//! Runtime wiring: catalog, dispatch server, dispatcher and orchestrator.

use std::sync::Arc;

use rchat::{Orchestrator, OrchestrationPolicy};
use rdispatch::{DispatchServer, HttpDispatchClient};
use robserve::{Guarded, standard_hooks};
use rprovider::ModelProvider;
use rresource::{InMemoryMailbox, Mailbox, StaticHeadcount};
use rtooling::adapters::{
    EmailDetailAdapter, EmployeeCountAdapter, SearchEmailsAdapter, UnreadEmailsAdapter,
};
use rtooling::{RegistryError, ToolDispatcher, ToolRegistry, ToolSet};

use crate::{RelayConfig, RelayError, RelayErrorKind, build_provider};

/// A dispatcher together with the catalog it serves.
#[derive(Clone)]
pub struct DispatchBinding {
    pub dispatcher: Arc<dyn ToolDispatcher>,
    pub registry: Arc<ToolRegistry>,
    pub remote: bool,
}

impl std::fmt::Debug for DispatchBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchBinding")
            .field("tools", &self.registry.len())
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

pub fn build_mailbox(config: &RelayConfig) -> Arc<dyn Mailbox> {
    match config.gmail_token() {
        Some(token) => gmail_mailbox(token),
        None => Arc::new(InMemoryMailbox::demo()),
    }
}

#[cfg(feature = "gmail")]
fn gmail_mailbox(token: &str) -> Arc<dyn Mailbox> {
    let auth = Arc::new(rresource::StaticTokenProvider::new(token));
    Arc::new(rresource::GmailMailbox::new(auth))
}

#[cfg(not(feature = "gmail"))]
fn gmail_mailbox(_token: &str) -> Arc<dyn Mailbox> {
    tracing::warn!("GMAIL_ACCESS_TOKEN is set but gmail support is not compiled in");
    Arc::new(InMemoryMailbox::demo())
}

/// The default catalog, in presentation order: headcount, unread, search, detail.
pub fn build_tool_set(config: &RelayConfig) -> Result<ToolSet, RelayError> {
    let mailbox = build_mailbox(config);

    let mut tools = ToolSet::new();
    tools
        .register(EmployeeCountAdapter::new(Arc::new(StaticHeadcount(
            config.headcount,
        ))))
        .map_err(registry_error)?;
    tools
        .register(UnreadEmailsAdapter::new(Arc::clone(&mailbox)))
        .map_err(registry_error)?;
    tools
        .register(SearchEmailsAdapter::new(Arc::clone(&mailbox)))
        .map_err(registry_error)?;
    tools
        .register(EmailDetailAdapter::new(mailbox))
        .map_err(registry_error)?;

    Ok(tools)
}

pub fn build_registry(config: &RelayConfig) -> Result<Arc<ToolRegistry>, RelayError> {
    Ok(build_tool_set(config)?.registry())
}

pub fn build_dispatch_server(config: &RelayConfig) -> Result<DispatchServer, RelayError> {
    Ok(DispatchServer::new(build_tool_set(config)?)
        .with_config(config.dispatch_config())
        .with_hooks(Arc::new(Guarded::new(standard_hooks()))))
}

/// Remote when a dispatch URL is configured, otherwise an in-process server.
pub async fn build_dispatcher(config: &RelayConfig) -> Result<DispatchBinding, RelayError> {
    if let Some(url) = config.remote_dispatch_url() {
        let client =
            HttpDispatchClient::new(url).with_timeout(config.dispatch_config().call_timeout);
        let registry = Arc::new(client.fetch_registry().await?);
        tracing::info!(dispatch_url = url, tools = registry.len(), "using remote dispatch server");
        return Ok(DispatchBinding {
            dispatcher: Arc::new(client),
            registry,
            remote: true,
        });
    }

    let server = build_dispatch_server(config)?;
    let registry = server.registry();
    Ok(DispatchBinding {
        dispatcher: Arc::new(server),
        registry,
        remote: false,
    })
}

pub async fn build_orchestrator(config: &RelayConfig) -> Result<Orchestrator, RelayError> {
    let provider = build_provider(config)?;
    let binding = build_dispatcher(config).await?;
    build_orchestrator_with(config, provider, binding)
}

pub fn build_orchestrator_with(
    config: &RelayConfig,
    provider: Arc<dyn ModelProvider>,
    binding: DispatchBinding,
) -> Result<Orchestrator, RelayError> {
    Ok(
        Orchestrator::builder(provider, binding.dispatcher, binding.registry)
            .model(&config.model)
            .policy(OrchestrationPolicy::default())
            .hooks(Arc::new(Guarded::new(standard_hooks())))
            .build()?,
    )
}

fn registry_error(error: RegistryError) -> RelayError {
    RelayError::new(RelayErrorKind::Config, error.to_string())
}
