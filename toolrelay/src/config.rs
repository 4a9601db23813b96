//! Process configuration resolved from flags and environment variables.
//!
//! ```rust
//! use clap::Parser;
//! use toolrelay::RelayConfig;
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     relay: RelayConfig,
//! }
//!
//! let cli = Cli::parse_from(["toolrelay", "--headcount", "42", "--call-timeout-secs", "5"]);
//! assert_eq!(cli.relay.headcount, 42);
//! assert_eq!(cli.relay.dispatch_config().call_timeout.as_secs(), 5);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;
use rchat::OrchestrationError;
use rdispatch::{DispatchConfig, DispatchError};
use rprovider::ProviderError;

#[derive(Debug, Clone, Args)]
pub struct RelayConfig {
    /// API key for the model provider.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "TOOLRELAY_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Overrides the provider endpoint, e.g. for a compatible gateway.
    #[arg(long, env = "TOOLRELAY_OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "TOOLRELAY_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// When set, tool calls go to this dispatch server instead of running in-process.
    #[arg(long, env = "TOOLRELAY_DISPATCH_URL")]
    pub dispatch_url: Option<String>,

    /// Backs the mailbox tools with Gmail. Without it a demo mailbox is used.
    #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
    pub gmail_access_token: Option<String>,

    #[arg(long, env = "TOOLRELAY_HEADCOUNT", default_value_t = 120)]
    pub headcount: u64,

    #[arg(long, env = "TOOLRELAY_CALL_TIMEOUT_SECS", default_value_t = 30)]
    pub call_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: "gpt-4o-mini".to_string(),
            openai_base_url: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            dispatch_url: None,
            gmail_access_token: None,
            headcount: 120,
            call_timeout_secs: 30,
        }
    }
}

impl RelayConfig {
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::default()
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs.max(1)))
    }

    /// Non-blank API key, or a configuration error naming the variable.
    pub fn api_key(&self) -> Result<&str, RelayError> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RelayError::config("OPENAI_API_KEY is required to ask the model"))
    }

    pub fn gmail_token(&self) -> Option<&str> {
        self.gmail_access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn remote_dispatch_url(&self) -> Option<&str> {
        self.dispatch_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayErrorKind {
    Config,
    Provider,
    Dispatch,
    Orchestration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayError {
    pub kind: RelayErrorKind,
    pub message: String,
}

impl RelayError {
    pub fn new(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(RelayErrorKind::Config, message)
    }
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for RelayError {}

impl From<ProviderError> for RelayError {
    fn from(error: ProviderError) -> Self {
        Self::new(RelayErrorKind::Provider, error.to_string())
    }
}

impl From<DispatchError> for RelayError {
    fn from(error: DispatchError) -> Self {
        Self::new(RelayErrorKind::Dispatch, error.to_string())
    }
}

impl From<OrchestrationError> for RelayError {
    fn from(error: OrchestrationError) -> Self {
        Self::new(RelayErrorKind::Orchestration, error.to_string())
    }
}
