//! Model provider construction from process configuration.

use std::sync::Arc;
#[cfg(feature = "provider-openai")]
use std::time::Duration;

use rprovider::ModelProvider;

use crate::{RelayConfig, RelayError};

#[cfg(feature = "provider-openai")]
const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[cfg(feature = "provider-openai")]
pub fn build_provider(config: &RelayConfig) -> Result<Arc<dyn ModelProvider>, RelayError> {
    use rprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};
    use rprovider::{ProviderError, ProviderId, SecureCredentialManager};
    use robserve::{Guarded, standard_hooks};

    let api_key = config.api_key()?;
    let credentials = Arc::new(SecureCredentialManager::new());
    match &config.openai_base_url {
        // Compatible gateways issue keys in their own formats.
        Some(_) => credentials.set_api_key(ProviderId::OpenAi, api_key)?,
        None => credentials.set_openai_api_key(api_key)?,
    }

    let http = reqwest::Client::builder()
        .timeout(PROVIDER_HTTP_TIMEOUT)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;
    let mut transport = OpenAiHttpTransport::new(http);
    if let Some(base_url) = &config.openai_base_url {
        transport = transport.with_base_url(base_url);
    }

    let provider = OpenAiProvider::new(credentials, Arc::new(transport))
        .with_fallback_model(&config.model)
        .with_hooks(Arc::new(Guarded::new(standard_hooks())));

    Ok(Arc::new(provider))
}

#[cfg(not(feature = "provider-openai"))]
pub fn build_provider(_config: &RelayConfig) -> Result<Arc<dyn ModelProvider>, RelayError> {
    Err(RelayError::config(
        "toolrelay was built without a model provider; enable the `provider-openai` feature",
    ))
}
