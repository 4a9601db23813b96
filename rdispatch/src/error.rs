use std::error::Error;
use std::fmt::{Display, Formatter};

use rtooling::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    Transport,
    Protocol,
    Registry,
}

/// Failures of the dispatch client outside a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn new(kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(DispatchErrorKind::Transport, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(DispatchErrorKind::Protocol, message)
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for DispatchError {}

impl From<RegistryError> for DispatchError {
    fn from(error: RegistryError) -> Self {
        Self::new(DispatchErrorKind::Registry, error.to_string())
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::protocol(error.to_string())
        } else {
            Self::transport(error.to_string())
        }
    }
}
