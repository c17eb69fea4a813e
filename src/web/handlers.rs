//! HTTP request handlers.

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use super::server::{AppState, RequestId};
use crate::docs::{render, DocsPage, ExampleContext, TemplateId};
use crate::error::Error;

/// Request header naming the signed-in dashboard user, shown in the page header.
pub const USER_HEADER: &str = "x-aiproxy-user";

fn signed_in_user(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Handle GET /docs
pub async fn docs_page(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    let user = signed_in_user(&headers);
    let page = DocsPage::build(&state.config.page_inputs());

    tracing::info!(
        request_id = %request_id.0,
        user = ?user,
        language_models = ?page.language_models.state,
        embedding_models = ?page.embedding_models.state,
        "Rendering documentation page"
    );

    let body = state.shell.render(&page, user);
    ([(header::CONTENT_TYPE, state.shell.content_type())], body).into_response()
}

/// Handle GET /docs.json - the resolved page for an external page shell
pub async fn docs_json(State(state): State<AppState>) -> Json<DocsPage> {
    Json(DocsPage::build(&state.config.page_inputs()))
}

/// Handle GET /docs/samples/:id - a single rendered sample as plain text
pub async fn docs_sample(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, Error> {
    let id: TemplateId = id.parse().map_err(|e| {
        tracing::debug!(sample = %id, "Unknown sample requested");
        Error::from(e)
    })?;

    let inputs = state.config.page_inputs();
    let context = ExampleContext::resolve(
        &inputs.base_url,
        &inputs.language_models,
        &inputs.embedding_models,
    );

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render(id, &context),
    )
        .into_response())
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "aiproxy-docs"
    }))
}
