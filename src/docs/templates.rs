//! Example request/response templates and their rendering.
//!
//! Every sample on the page is a fixed template with named substitution
//! points (`{{base_url}}`, `{{chat_model}}`, `{{embedding_model}}`). Values are
//! escaped for the syntax surrounding the substitution point so an odd base
//! URL or model identifier cannot break out of a shell argument, a JSON string
//! or a source-code string literal.

use serde::Serialize;

use super::allowlist::{resolve_example, ModelAllowlist, ModelCategory};

/// Substituted for a base URL that is empty or not an absolute http(s) URL.
pub const BASE_URL_PLACEHOLDER: &str = "https://your-proxy.example.com";

/// Resolved values used to fill the templates for one page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleContext {
    pub base_url: String,
    pub example_language_model: String,
    pub example_embedding_model: String,
}

impl ExampleContext {
    /// Resolve the example models from the allow-lists and normalize the base URL.
    pub fn resolve(
        base_url: &str,
        language_models: &ModelAllowlist,
        embedding_models: &ModelAllowlist,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            example_language_model: resolve_example(
                language_models,
                ModelCategory::Language.builtin_default(),
            )
            .to_string(),
            example_embedding_model: resolve_example(
                embedding_models,
                ModelCategory::Embedding.builtin_default(),
            )
            .to_string(),
        }
    }

    fn value(&self, slot: Slot) -> &str {
        match slot {
            Slot::BaseUrl => &self.base_url,
            Slot::ChatModel => &self.example_language_model,
            Slot::EmbeddingModel => &self.example_embedding_model,
        }
    }
}

/// Trim a trailing `/` from the base URL, or fall back to
/// [`BASE_URL_PLACEHOLDER`] when it is unusable.
///
/// The fallback is logged at debug level.
/// `Config::validate` warns about an unusable base URL once at load.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::debug!("Base URL is not configured, using placeholder in examples");
        return BASE_URL_PLACEHOLDER.to_string();
    }

    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            trimmed.trim_end_matches('/').to_string()
        }
        Ok(parsed) => {
            tracing::debug!(
                base_url = %trimmed,
                scheme = %parsed.scheme(),
                "Base URL is not an http(s) URL, using placeholder in examples"
            );
            BASE_URL_PLACEHOLDER.to_string()
        }
        Err(e) => {
            tracing::debug!(
                base_url = %trimmed,
                error = %e,
                "Base URL is malformed, using placeholder in examples"
            );
            BASE_URL_PLACEHOLDER.to_string()
        }
    }
}

/// A named substitution point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    BaseUrl,
    ChatModel,
    EmbeddingModel,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "base_url" => Some(Slot::BaseUrl),
            "chat_model" => Some(Slot::ChatModel),
            "embedding_model" => Some(Slot::EmbeddingModel),
            _ => None,
        }
    }
}

/// Syntax a sample is written in. Determines how substituted values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// curl command line. The base URL is a bare shell word and model ids sit
    /// in a JSON body inside single quotes.
    Shell,
    Json,
    Python,
    #[serde(rename = "javascript")]
    JavaScript,
}

impl SampleFormat {
    /// Language tag for syntax highlighting.
    pub fn language(self) -> &'static str {
        match self {
            SampleFormat::Shell => "bash",
            SampleFormat::Json => "json",
            SampleFormat::Python => "python",
            SampleFormat::JavaScript => "javascript",
        }
    }
}

/// Identifier of a sample template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    QuickstartCurl,
    ChatCurl,
    ChatCurlStreaming,
    ChatResponse,
    EmbeddingsCurl,
    EmbeddingsResponse,
    ModelsCurl,
    ModelsResponse,
    PythonSdk,
    PythonSdkStreaming,
    JsSdk,
}

impl TemplateId {
    /// All ids, in the same order as [`TEMPLATES`].
    pub const ALL: [TemplateId; 11] = [
        TemplateId::QuickstartCurl,
        TemplateId::ChatCurl,
        TemplateId::ChatCurlStreaming,
        TemplateId::ChatResponse,
        TemplateId::EmbeddingsCurl,
        TemplateId::EmbeddingsResponse,
        TemplateId::ModelsCurl,
        TemplateId::ModelsResponse,
        TemplateId::PythonSdk,
        TemplateId::PythonSdkStreaming,
        TemplateId::JsSdk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::QuickstartCurl => "quickstart-curl",
            TemplateId::ChatCurl => "chat-curl",
            TemplateId::ChatCurlStreaming => "chat-curl-streaming",
            TemplateId::ChatResponse => "chat-response",
            TemplateId::EmbeddingsCurl => "embeddings-curl",
            TemplateId::EmbeddingsResponse => "embeddings-response",
            TemplateId::ModelsCurl => "models-curl",
            TemplateId::ModelsResponse => "models-response",
            TemplateId::PythonSdk => "python-sdk",
            TemplateId::PythonSdkStreaming => "python-sdk-streaming",
            TemplateId::JsSdk => "js-sdk",
        }
    }

    pub fn template(self) -> &'static Template {
        &TEMPLATES[self as usize]
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown template id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sample '{0}'")]
pub struct UnknownTemplate(pub String);

impl std::str::FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// A fixed sample template.
#[derive(Debug)]
pub struct Template {
    pub id: TemplateId,
    pub title: &'static str,
    pub format: SampleFormat,
    pub body: &'static str,
}

/// The template table, indexed by `TemplateId as usize`.
pub static TEMPLATES: [Template; 11] = [
    Template {
        id: TemplateId::QuickstartCurl,
        title: "Make Your First Request",
        format: SampleFormat::Shell,
        body: r#"curl {{base_url}}/proxy/v1/chat/completions \
  -H "Authorization: Bearer YOUR_API_KEY" \
  -H "Content-Type: application/json" \
  -d '{
    "model": "{{chat_model}}",
    "messages": [
      {"role": "user", "content": "Hello!"}
    ]
  }'"#,
    },
    Template {
        id: TemplateId::ChatCurl,
        title: "Example Request",
        format: SampleFormat::Shell,
        body: r#"curl {{base_url}}/proxy/v1/chat/completions \
  -H "Authorization: Bearer YOUR_API_KEY" \
  -H "Content-Type: application/json" \
  -d '{
    "model": "{{chat_model}}",
    "messages": [
      {
        "role": "system",
        "content": "You are a helpful assistant."
      },
      {
        "role": "user",
        "content": "What is the capital of France?"
      }
    ],
    "temperature": 0.7
  }'"#,
    },
    Template {
        id: TemplateId::ChatCurlStreaming,
        title: "Streaming",
        format: SampleFormat::Shell,
        body: r#"curl {{base_url}}/proxy/v1/chat/completions \
  -H "Authorization: Bearer YOUR_API_KEY" \
  -H "Content-Type: application/json" \
  -d '{
    "model": "{{chat_model}}",
    "messages": [{"role": "user", "content": "Hello!"}],
    "stream": true
  }'"#,
    },
    Template {
        id: TemplateId::ChatResponse,
        title: "Example Response",
        format: SampleFormat::Json,
        body: r#"{
  "id": "chatcmpl-123",
  "object": "chat.completion",
  "created": 1677652288,
  "model": "{{chat_model}}",
  "choices": [
    {
      "index": 0,
      "message": {
        "role": "assistant",
        "content": "The capital of France is Paris."
      },
      "finish_reason": "stop"
    }
  ],
  "usage": {
    "prompt_tokens": 20,
    "completion_tokens": 10,
    "total_tokens": 30
  }
}"#,
    },
    Template {
        id: TemplateId::EmbeddingsCurl,
        title: "Example Request",
        format: SampleFormat::Shell,
        body: r#"curl {{base_url}}/proxy/v1/embeddings \
  -H "Authorization: Bearer YOUR_API_KEY" \
  -H "Content-Type: application/json" \
  -d '{
    "model": "{{embedding_model}}",
    "input": "The quick brown fox jumps over the lazy dog"
  }'"#,
    },
    Template {
        id: TemplateId::EmbeddingsResponse,
        title: "Example Response",
        format: SampleFormat::Json,
        body: r#"{
  "object": "list",
  "data": [
    {
      "object": "embedding",
      "index": 0,
      "embedding": [0.023, -0.015, 0.042, ...]
    }
  ],
  "model": "{{embedding_model}}",
  "usage": {
    "prompt_tokens": 10,
    "total_tokens": 10
  }
}"#,
    },
    Template {
        id: TemplateId::ModelsCurl,
        title: "Example Request",
        format: SampleFormat::Shell,
        body: r#"curl {{base_url}}/proxy/v1/models \
  -H "Authorization: Bearer YOUR_API_KEY" \
  -H "Content-Type: application/json""#,
    },
    Template {
        id: TemplateId::ModelsResponse,
        title: "Example Response",
        format: SampleFormat::Json,
        body: r#"{
  "object": "list",
  "data": [
    {
      "id": "{{chat_model}}",
      "object": "model",
      "created": 1686935002,
      "owned_by": "organization-owner"
    }
  ]
}"#,
    },
    Template {
        id: TemplateId::PythonSdk,
        title: "Python (OpenAI SDK)",
        format: SampleFormat::Python,
        body: r#"from openai import OpenAI

client = OpenAI(
    api_key="YOUR_API_KEY",
    base_url="{{base_url}}/proxy/v1"
)

response = client.chat.completions.create(
    model="{{chat_model}}",
    messages=[
        {"role": "user", "content": "Hello!"}
    ]
)

print(response.choices[0].message.content)"#,
    },
    Template {
        id: TemplateId::PythonSdkStreaming,
        title: "Streaming with Python",
        format: SampleFormat::Python,
        body: r#"from openai import OpenAI

client = OpenAI(
    api_key="YOUR_API_KEY",
    base_url="{{base_url}}/proxy/v1"
)

stream = client.chat.completions.create(
    model="{{chat_model}}",
    messages=[{"role": "user", "content": "Tell me a story"}],
    stream=True
)

for chunk in stream:
    if chunk.choices[0].delta.content:
        print(chunk.choices[0].delta.content, end="")"#,
    },
    Template {
        id: TemplateId::JsSdk,
        title: "JavaScript/TypeScript (OpenAI SDK)",
        format: SampleFormat::JavaScript,
        body: r#"import OpenAI from 'openai';

const client = new OpenAI({
  apiKey: 'YOUR_API_KEY',
  baseURL: '{{base_url}}/proxy/v1',
});

const response = await client.chat.completions.create({
  model: '{{chat_model}}',
  messages: [
    { role: 'user', content: 'Hello!' }
  ],
});

console.log(response.choices[0].message.content);"#,
    },
];

/// A piece of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Slot(Slot),
}

/// Split a template body into literal text and substitution points.
///
/// An unrecognized `{{name}}` is kept as literal text.
fn segments(body: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };

        match Slot::from_name(&after[..end]) {
            Some(slot) => {
                if start > 0 {
                    out.push(Segment::Literal(&rest[..start]));
                }
                out.push(Segment::Slot(slot));
            }
            None => {
                tracing::error!(placeholder = %&after[..end], "Unknown template placeholder");
                out.push(Segment::Literal(&rest[..start + 2 + end + 2]));
            }
        }
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Characters inserted verbatim everywhere.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':' | '/' | '@' | '+')
}

/// Body of a JSON string literal, without the surrounding quotes.
fn json_string_body(value: &str) -> String {
    let quoted = serde_json::to_string(value).unwrap_or_default();
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or_default()
        .to_string()
}

/// Close the surrounding single quote, emit an escaped quote, reopen.
fn escape_single_quoted_shell(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Escape `value` for the position of `slot` within a sample of `format`.
pub fn escape(format: SampleFormat, slot: Slot, value: &str) -> String {
    if value.chars().all(is_safe_char) {
        return value.to_string();
    }

    match (format, slot) {
        (SampleFormat::Shell, Slot::BaseUrl) => {
            format!("'{}'", escape_single_quoted_shell(value))
        }
        (SampleFormat::Shell, _) => escape_single_quoted_shell(&json_string_body(value)),
        (SampleFormat::Json, _) | (SampleFormat::Python, _) => json_string_body(value),
        (SampleFormat::JavaScript, _) => json_string_body(value).replace('\'', r"\'"),
    }
}

/// Render one sample.
pub fn render(id: TemplateId, context: &ExampleContext) -> String {
    let template = id.template();
    let mut out = String::with_capacity(template.body.len() + 64);

    for segment in segments(template.body) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Slot(slot) => {
                out.push_str(&escape(template.format, slot, context.value(slot)))
            }
        }
    }
    out
}

/// Substitution values recovered from a rendered sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
}

impl Extracted {
    fn set(&mut self, slot: Slot, value: &str) -> bool {
        let field = match slot {
            Slot::BaseUrl => &mut self.base_url,
            Slot::ChatModel => &mut self.chat_model,
            Slot::EmbeddingModel => &mut self.embedding_model,
        };
        match field {
            Some(existing) => existing == value,
            None => {
                *field = Some(value.to_string());
                true
            }
        }
    }
}

/// Recover the substituted values from text rendered from template `id`.
///
/// Returns `None` when the text does not match the template or a slot that
/// appears twice was filled with different values.
pub fn extract(id: TemplateId, rendered: &str) -> Option<Extracted> {
    let segments = segments(id.template().body);
    let mut extracted = Extracted::default();
    let mut rest = rendered;

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Literal(text) => {
                rest = rest.strip_prefix(*text)?;
            }
            Segment::Slot(slot) => {
                let value = match segments.get(i + 1) {
                    Some(Segment::Literal(next)) => &rest[..rest.find(*next)?],
                    Some(Segment::Slot(_)) => return None,
                    None => rest,
                };
                if !extracted.set(*slot, value) {
                    return None;
                }
                rest = &rest[value.len()..];
            }
        }
    }

    rest.is_empty().then_some(extracted)
}

/// Check that every substitution point in the rendered sample carries the
/// context value, escaped for its position.
pub fn round_trips(id: TemplateId, context: &ExampleContext) -> bool {
    let template = id.template();
    let Some(extracted) = extract(id, &render(id, context)) else {
        return false;
    };

    let matches_context = |slot: Slot, got: &Option<String>| match got {
        Some(value) => *value == escape(template.format, slot, context.value(slot)),
        None => true,
    };

    matches_context(Slot::BaseUrl, &extracted.base_url)
        && matches_context(Slot::ChatModel, &extracted.chat_model)
        && matches_context(Slot::EmbeddingModel, &extracted.embedding_model)
}

/// A rendered sample, ready for the page shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSample {
    pub id: TemplateId,
    pub title: &'static str,
    pub format: SampleFormat,
    pub language: &'static str,
    pub text: String,
}

impl RenderedSample {
    pub fn new(id: TemplateId, context: &ExampleContext) -> Self {
        let template = id.template();
        Self {
            id,
            title: template.title,
            format: template.format,
            language: template.format.language(),
            text: render(id, context),
        }
    }
}

/// Render every sample in table order.
pub fn render_all(context: &ExampleContext) -> Vec<RenderedSample> {
    TemplateId::ALL
        .into_iter()
        .map(|id| RenderedSample::new(id, context))
        .collect()
}
