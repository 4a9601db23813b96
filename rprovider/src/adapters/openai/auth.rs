//! API key handling for chat-completions backends.

use std::fmt::Formatter;

use crate::{ProviderError, ProviderId, SecretString, SecureCredentialManager};

/// Credentials attached to a single backend call.
#[derive(Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    ApiKey(SecretString),
}

impl OpenAiAuth {
    pub fn bearer_token(&self) -> &str {
        match self {
            Self::ApiKey(key) => key.expose(),
        }
    }
}

impl std::fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("OpenAiAuth::ApiKey([REDACTED])"),
        }
    }
}

impl SecureCredentialManager {
    /// Stores a key issued by api.openai.com.
    ///
    /// Keys for compatible gateways use their own formats and go through
    /// [`SecureCredentialManager::set_api_key`] instead.
    pub fn set_openai_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-") {
            return Err(ProviderError::authentication(
                "OpenAI API key must start with 'sk-'",
            ));
        }
        if api_key.chars().any(char::is_whitespace) {
            return Err(ProviderError::authentication(
                "OpenAI API key must not contain whitespace",
            ));
        }

        self.set_api_key(ProviderId::OpenAi, api_key)
    }
}

pub(crate) fn resolve_openai_auth(
    credentials: &SecureCredentialManager,
) -> Result<OpenAiAuth, ProviderError> {
    credentials
        .api_key(ProviderId::OpenAi)?
        .filter(|key| !key.is_empty())
        .map(OpenAiAuth::ApiKey)
        .ok_or_else(|| ProviderError::authentication("no API key configured for 'openai'"))
}
