//! Static reference content: endpoints, request shapes, status codes, notes.

use serde::Serialize;

use super::templates::TemplateId;

/// Header line every request must carry.
pub const AUTH_HEADER_EXAMPLE: &str = "Authorization: Bearer YOUR_API_KEY";

/// Maximum number of active API keys per user.
pub const MAX_API_KEYS: u32 = 50;

/// Maximum request body size, in megabytes.
pub const MAX_REQUEST_MB: u32 = 20;

/// Upstream request timeout, in seconds.
pub const REQUEST_TIMEOUT_SECS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// One documented proxy endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub title: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub description: &'static str,
    /// Annotated request body, for endpoints that take one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_shape: Option<&'static str>,
    /// Samples shown under the endpoint, in display order.
    pub samples: &'static [TemplateId],
}

pub static ENDPOINTS: [Endpoint; 3] = [
    Endpoint {
        title: "Chat Completions",
        method: HttpMethod::Post,
        path: "/proxy/v1/chat/completions",
        description: "Create a chat completion for the given conversation. \
Supports streaming and non-streaming modes.",
        request_shape: Some(CHAT_REQUEST_SHAPE),
        samples: &[
            TemplateId::ChatCurl,
            TemplateId::ChatResponse,
            TemplateId::ChatCurlStreaming,
        ],
    },
    Endpoint {
        title: "Embeddings",
        method: HttpMethod::Post,
        path: "/proxy/v1/embeddings",
        description: "Generate vector embeddings from text input.",
        request_shape: Some(EMBEDDINGS_REQUEST_SHAPE),
        samples: &[TemplateId::EmbeddingsCurl, TemplateId::EmbeddingsResponse],
    },
    Endpoint {
        title: "List Models",
        method: HttpMethod::Get,
        path: "/proxy/v1/models",
        description: "List all available models.",
        request_shape: None,
        samples: &[TemplateId::ModelsCurl, TemplateId::ModelsResponse],
    },
];

/// Samples in the "SDK Examples" section.
pub const SDK_SAMPLES: [TemplateId; 3] = [
    TemplateId::PythonSdk,
    TemplateId::JsSdk,
    TemplateId::PythonSdkStreaming,
];

const CHAT_REQUEST_SHAPE: &str = r#"{
  "model": "string",              // Required: Model ID
  "messages": [                   // Required: Array of messages
    {
      "role": "user|assistant|system",
      "content": "string"
    }
  ],
  "stream": false,                // Optional: Enable streaming
  "temperature": 1.0,             // Optional: 0-2, controls randomness
  "max_tokens": null,             // Optional: Max tokens to generate
  "top_p": 1.0,                   // Optional: Nucleus sampling
  // ... other OpenAI-compatible parameters
}"#;

const EMBEDDINGS_REQUEST_SHAPE: &str = r#"{
  "model": "string",              // Required: Embedding model ID
  "input": "string" | ["array"],  // Required: Text to embed
  "encoding_format": "float"      // Optional: "float" or "base64"
}"#;

/// Severity used by the page shell to pick an accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCode {
    pub code: u16,
    pub reason: &'static str,
    pub description: String,
    pub severity: StatusSeverity,
}

pub fn status_codes() -> Vec<StatusCode> {
    vec![
        StatusCode {
            code: 200,
            reason: "OK",
            description: "Request succeeded".to_string(),
            severity: StatusSeverity::Success,
        },
        StatusCode {
            code: 400,
            reason: "Bad Request",
            description: "Invalid request parameters".to_string(),
            severity: StatusSeverity::Warning,
        },
        StatusCode {
            code: 401,
            reason: "Unauthorized",
            description: "Missing or invalid API key".to_string(),
            severity: StatusSeverity::Error,
        },
        StatusCode {
            code: 413,
            reason: "Payload Too Large",
            description: format!("Request body exceeds {}MB limit", MAX_REQUEST_MB),
            severity: StatusSeverity::Error,
        },
        StatusCode {
            code: 500,
            reason: "Internal Server Error",
            description: "Server error occurred".to_string(),
            severity: StatusSeverity::Error,
        },
    ]
}

/// An entry in the "Important Notes" list.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub label: &'static str,
    pub text: String,
}

pub fn notes() -> Vec<Note> {
    vec![
        Note {
            label: "Request Size",
            text: format!("Maximum request body size is {}MB.", MAX_REQUEST_MB),
        },
        Note {
            label: "Timeout",
            text: format!("Requests will timeout after {} seconds.", REQUEST_TIMEOUT_SECS),
        },
        Note {
            label: "API Keys",
            text: format!("You can create up to {} API keys per user.", MAX_API_KEYS),
        },
        Note {
            label: "Logging",
            text: "All requests are logged with token usage, duration, and IP address \
for monitoring purposes."
                .to_string(),
        },
        Note {
            label: "OpenAI Compatibility",
            text: "This API is compatible with OpenAI's client libraries. Simply change \
the base URL to use this proxy."
                .to_string(),
        },
    ]
}
