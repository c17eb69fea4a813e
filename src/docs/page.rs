//! Assembly of the full documentation page.

use serde::Serialize;

use super::allowlist::{AllowlistView, ModelAllowlist, ModelCategory, FALLBACK_NOTE};
use super::reference::{self, Endpoint, Note, StatusCode, AUTH_HEADER_EXAMPLE, ENDPOINTS};
use super::templates::{render_all, ExampleContext, RenderedSample, TemplateId};

/// Inputs to one page render.
#[derive(Debug, Clone, Default)]
pub struct PageInputs {
    pub base_url: String,
    pub language_models: ModelAllowlist,
    pub embedding_models: ModelAllowlist,
}

/// Everything the page shell needs, already resolved and rendered.
#[derive(Debug, Clone, Serialize)]
pub struct DocsPage {
    pub title: &'static str,
    pub context: ExampleContext,
    pub auth_header: &'static str,
    pub endpoints: &'static [Endpoint],
    pub samples: Vec<RenderedSample>,
    pub language_models: AllowlistView,
    pub embedding_models: AllowlistView,
    pub fallback_note: &'static str,
    pub status_codes: Vec<StatusCode>,
    pub notes: Vec<Note>,
}

impl DocsPage {
    pub const TITLE: &'static str = "API Documentation";

    pub fn build(inputs: &PageInputs) -> Self {
        let context = ExampleContext::resolve(
            &inputs.base_url,
            &inputs.language_models,
            &inputs.embedding_models,
        );

        tracing::debug!(
            base_url = %context.base_url,
            language_model = %context.example_language_model,
            embedding_model = %context.example_embedding_model,
            "Resolved documentation examples"
        );

        let samples = render_all(&context);

        Self {
            title: Self::TITLE,
            context,
            auth_header: AUTH_HEADER_EXAMPLE,
            endpoints: &ENDPOINTS,
            samples,
            language_models: AllowlistView::new(ModelCategory::Language, &inputs.language_models),
            embedding_models: AllowlistView::new(
                ModelCategory::Embedding,
                &inputs.embedding_models,
            ),
            fallback_note: FALLBACK_NOTE,
            status_codes: reference::status_codes(),
            notes: reference::notes(),
        }
    }

    /// Rendered sample for `id`.
    pub fn sample(&self, id: TemplateId) -> Option<&RenderedSample> {
        self.samples.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::allowlist::AllowlistState;

    fn inputs(language: ModelAllowlist, embedding: ModelAllowlist) -> PageInputs {
        PageInputs {
            base_url: "https://ai.example.org".to_string(),
            language_models: language,
            embedding_models: embedding,
        }
    }

    fn chat_samples(page: &DocsPage) -> Vec<&RenderedSample> {
        page.samples
            .iter()
            .filter(|s| !matches!(s.id, TemplateId::EmbeddingsCurl | TemplateId::EmbeddingsResponse))
            .filter(|s| s.id != TemplateId::ModelsCurl)
            .collect()
    }

    #[test]
    fn test_unrestricted_language_models() {
        let page = DocsPage::build(&inputs(
            ModelAllowlist::Unrestricted,
            ModelAllowlist::Unrestricted,
        ));
        for sample in chat_samples(&page) {
            assert!(sample.text.contains("gpt-4"), "{} lacks gpt-4", sample.id);
        }
        assert_eq!(
            page.language_models.message.as_deref(),
            Some("All language models are available.")
        );
    }

    #[test]
    fn test_restricted_language_models() {
        let page = DocsPage::build(&inputs(
            ModelAllowlist::restricted(["claude-3-opus", "claude-3-haiku"]),
            ModelAllowlist::Unrestricted,
        ));
        for sample in chat_samples(&page) {
            assert!(sample.text.contains("claude-3-opus"), "{}", sample.id);
            assert!(!sample.text.contains("gpt-4"), "{}", sample.id);
            assert!(!sample.text.contains("claude-3-haiku"), "{}", sample.id);
        }
        assert_eq!(page.language_models.state, AllowlistState::Listed);
        assert_eq!(
            page.language_models.items,
            vec!["claude-3-opus".to_string(), "claude-3-haiku".to_string()]
        );
    }

    #[test]
    fn test_empty_language_models() {
        let page = DocsPage::build(&inputs(
            ModelAllowlist::restricted(Vec::<String>::new()),
            ModelAllowlist::Unrestricted,
        ));
        assert_eq!(page.context.example_language_model, "gpt-4");
        assert_eq!(page.language_models.state, AllowlistState::Empty);
        assert_eq!(
            page.language_models.message.as_deref(),
            Some("No language models are currently configured.")
        );
    }

    #[test]
    fn test_embedding_allowlist_is_independent() {
        let page = DocsPage::build(&inputs(
            ModelAllowlist::restricted(["claude-3-opus"]),
            ModelAllowlist::restricted(["voyage-3"]),
        ));
        let embeddings = page.sample(TemplateId::EmbeddingsCurl).unwrap();
        assert!(embeddings.text.contains(r#""model": "voyage-3""#));
        assert_eq!(page.embedding_models.items, vec!["voyage-3".to_string()]);
        assert_eq!(page.context.example_language_model, "claude-3-opus");
    }

    #[test]
    fn test_build_is_idempotent() {
        let inputs = inputs(
            ModelAllowlist::restricted(["m-1", "m-2"]),
            ModelAllowlist::Restricted(vec![]),
        );
        let first = serde_json::to_string(&DocsPage::build(&inputs)).unwrap();
        let second = serde_json::to_string(&DocsPage::build(&inputs)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_serializes_for_external_shell() {
        let page = DocsPage::build(&PageInputs::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["title"], "API Documentation");
        assert_eq!(json["context"]["base_url"], "https://your-proxy.example.com");
        assert_eq!(json["language_models"]["state"], "unrestricted");
        assert_eq!(json["samples"].as_array().unwrap().len(), TemplateId::ALL.len());
        assert_eq!(json["endpoints"].as_array().unwrap().len(), 3);
        assert_eq!(json["status_codes"][3]["code"], 413);
    }
}
