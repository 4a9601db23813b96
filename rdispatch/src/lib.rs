//! Dispatch server: the trust boundary between model-chosen tool calls and
//! tool execution.
//!
//! Every call, whatever happens inside it, ends in an [`rtooling::Envelope`].

mod client;
mod config;
mod error;
mod http;
mod server;

pub use client::HttpDispatchClient;
pub use config::DispatchConfig;
pub use error::{DispatchError, DispatchErrorKind};
pub use http::{
    RunningServer, SESSION_HEADER, TRACE_HEADER, router, serve, spawn_server, status_for,
};
pub use server::DispatchServer;
