//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all route into the dispatcher
//! - Wire up middleware (tracing, timeout)
//! - Buffer request bodies and build an `Env` per request
//! - Convert response triples into HTTP responses
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::http::env::Env;
use crate::http::response::Response;
use crate::lifecycle::shutdown;
use crate::routing::{DispatchError, Dispatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

/// HTTP server hosting one dispatcher.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.limits.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `stop` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        stop: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(stop))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Buffer the body, dispatch, convert the triple.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();
    let span = tracing::info_span!(
        "dispatch",
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
    );

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(parent: &span, error = %e, "Request body rejected");
            return body_rejection(&e).into_response();
        }
    };

    let mut env = Env::from_parts(&parts, body);
    let outcome = span.in_scope(|| {
        state
            .dispatcher
            .call(&mut env)
            .and_then(into_http_response)
    });

    match outcome {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(parent: &span, error = %e, "Dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// 413 when the body ran past the limit, 400 when it could not be read.
fn body_rejection(err: &axum::Error) -> (StatusCode, &'static str) {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        source = cause.source();
    }
    (StatusCode::BAD_REQUEST, "Request body unreadable")
}

/// Convert a response triple into an HTTP response.
///
/// A multi-line header value (several cookies) becomes one header field
/// per line.
pub fn into_http_response(response: Response) -> Result<HttpResponse, DispatchError> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|_| DispatchError::InvalidStatus(response.status))?;

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &response.headers {
        for line in value.split('\n') {
            builder = builder.header(name.as_str(), line);
        }
    }

    Ok(builder.body(Body::from(response.body_bytes()))?)
}
