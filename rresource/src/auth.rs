//! Authorization boundary for credentialed resources.

use std::fmt::{Debug, Formatter};

use crate::{ResourceError, ResourceFuture};

/// Opaque bearer credential handed to resource clients.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

pub trait AuthorizationProvider: Send + Sync {
    fn authorized_handle<'a>(&'a self) -> ResourceFuture<'a, Result<AccessToken, ResourceError>>;
}

/// Serves a fixed token, e.g. one minted out of band and passed through the environment.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: Option<AccessToken>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = if token.trim().is_empty() {
            None
        } else {
            Some(AccessToken::new(token.trim()))
        };

        Self { token }
    }
}

impl Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl AuthorizationProvider for StaticTokenProvider {
    fn authorized_handle<'a>(&'a self) -> ResourceFuture<'a, Result<AccessToken, ResourceError>> {
        Box::pin(async move {
            self.token
                .clone()
                .ok_or_else(|| ResourceError::unauthorized("no access token configured"))
        })
    }
}
