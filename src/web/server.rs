//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use crate::config::Config;
use crate::docs::{HtmlShell, PageShell};

/// Response header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-aiproxy-request-id";

/// Correlation ID assigned to every request.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub shell: Arc<dyn PageShell>,
}

impl AppState {
    /// State using the built-in HTML page shell.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            shell: Arc::new(HtmlShell),
        }
    }
}

async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.0.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/docs", get(handlers::docs_page))
        .route("/docs.json", get(handlers::docs_json))
        .route("/docs/samples/:id", get(handlers::docs_sample))
        .route("/health", get(handlers::health))
        // State and middleware
        .with_state(state)
        .layer(middleware::from_fn(assign_request_id))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting aiproxy-docs server");

    axum::serve(listener, app).await?;

    Ok(())
}
