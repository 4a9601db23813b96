//! HTTP surface for the dispatch server.
//!
//! Routes: `POST /tools/:name` runs one tool call, `GET /tools` lists the
//! catalog in registration order, `GET /health` answers `ok`. Tool call
//! responses always carry an envelope body; the status code mirrors its kind.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use rtooling::{
    Envelope, Parameters, ToolCallRequest, ToolDescriptor, ToolError, ToolErrorKind,
    ToolExecutionContext, parse_json_object,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::DispatchServer;

pub const SESSION_HEADER: &str = "x-toolrelay-session";
pub const TRACE_HEADER: &str = "x-toolrelay-trace";

pub fn router(server: DispatchServer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(call_tool))
        .with_state(server)
        .layer(TraceLayer::new_for_http())
}

pub fn status_for(envelope: &Envelope) -> StatusCode {
    match envelope.error_kind() {
        None => StatusCode::OK,
        Some(ToolErrorKind::UnknownTool | ToolErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(ToolErrorKind::InvalidParameters) => StatusCode::BAD_REQUEST,
        Some(ToolErrorKind::Unauthorized) => StatusCode::UNAUTHORIZED,
        Some(ToolErrorKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        Some(ToolErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn list_tools(State(server): State<DispatchServer>) -> Json<Vec<ToolDescriptor>> {
    Json(server.registry().list().cloned().collect())
}

async fn call_tool(
    State(server): State<DispatchServer>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Envelope>) {
    let context = context_from(&headers);
    let envelope = match parse_body(&body) {
        Ok(parameters) => server.handle(ToolCallRequest::new(name, parameters), context).await,
        Err(error) if server.registry().contains(&name) => {
            Envelope::from(error.with_tool_name(name))
        }
        Err(_) => {
            server
                .handle(ToolCallRequest::new(name, Parameters::new()), context)
                .await
        }
    };

    (status_for(&envelope), Json(envelope))
}

fn parse_body(body: &[u8]) -> Result<Parameters, ToolError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| ToolError::invalid_parameters("request body must be UTF-8 JSON"))?;
    parse_json_object(text)
}

fn context_from(headers: &HeaderMap) -> ToolExecutionContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    };

    let session = header(SESSION_HEADER).unwrap_or_else(|| "http".to_string());
    let context = ToolExecutionContext::new(session);
    match header(TRACE_HEADER) {
        Some(trace_id) => context.with_trace_id(trace_id),
        None => context,
    }
}

/// Serves `server` on `listener` until `shutdown` resolves.
pub async fn serve<F>(server: DispatchServer, listener: TcpListener, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Handle to a dispatch server running on a background task. Dropping it stops the server.
#[derive(Debug)]
pub struct RunningServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub async fn spawn_server(server: DispatchServer, addr: SocketAddr) -> io::Result<RunningServer> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        if let Err(error) = serve(server, listener, shutdown).await {
            tracing::error!(error = %error, "dispatch server stopped");
        }
    });

    Ok(RunningServer {
        addr,
        shutdown: Some(shutdown_tx),
    })
}
