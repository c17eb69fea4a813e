//! Error types for aiproxy-docs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for aiproxy-docs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for aiproxy-docs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    NotFound(String),

    #[error("Proxy request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Verification failed: {0}")]
    Verify(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::docs::templates::UnknownTemplate> for Error {
    fn from(e: crate::docs::templates::UnknownTemplate) -> Self {
        Error::NotFound(e.to_string())
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Verify(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Return OpenAI-compatible error format
        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "type": "aiproxy_docs_error",
                "code": status.as_u16()
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_response_body() {
        let response = Error::from(crate::docs::templates::UnknownTemplate(
            "go-sdk".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["message"], "Unknown sample 'go-sdk'");
        assert_eq!(json["error"]["type"], "aiproxy_docs_error");
        assert_eq!(json["error"]["code"], 404);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::Verify("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
