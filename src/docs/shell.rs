//! Page shell: turns a resolved [`DocsPage`] into markup.
//!
//! The shell owns layout and styling only. It never decides which models or
//! URLs appear; everything it prints comes from the page.

use std::fmt::Write;

use super::allowlist::{AllowlistState, AllowlistView};
use super::page::DocsPage;
use super::reference::{HttpMethod, SDK_SAMPLES};
use super::templates::{RenderedSample, TemplateId};

/// Renders a documentation page for display.
pub trait PageShell: Send + Sync {
    /// `user` is the signed-in user's display name, if any.
    fn render(&self, page: &DocsPage, user: Option<&str>) -> String;

    /// MIME type of the produced markup.
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Plain, dependency-free HTML shell.
#[derive(Debug, Clone, Default)]
pub struct HtmlShell;

impl HtmlShell {
    fn code_block(out: &mut String, sample: &RenderedSample) {
        let _ = writeln!(
            out,
            "<pre data-sample=\"{}\"><code class=\"language-{}\">{}</code></pre>",
            sample.id,
            sample.language,
            escape_html(&sample.text)
        );
    }

    fn sample_block(out: &mut String, page: &DocsPage, id: TemplateId) {
        if let Some(sample) = page.sample(id) {
            let _ = writeln!(out, "<h4>{}</h4>", escape_html(sample.title));
            Self::code_block(out, sample);
        }
    }

    fn allowlist_card(out: &mut String, view: &AllowlistView) {
        let _ = writeln!(
            out,
            "<div class=\"card\" data-allowlist=\"{}\" data-state=\"{}\">",
            view.category,
            match view.state {
                AllowlistState::Unrestricted => "unrestricted",
                AllowlistState::Empty => "empty",
                AllowlistState::Listed => "listed",
            }
        );
        let _ = writeln!(out, "<h3>{}</h3>", escape_html(&view.title));
        match &view.message {
            Some(message) => {
                let _ = writeln!(out, "<p>{}</p>", escape_html(message));
            }
            None => {
                out.push_str("<ul class=\"models\">\n");
                for model in &view.items {
                    let _ = writeln!(out, "<li><code>{}</code></li>", escape_html(model));
                }
                out.push_str("</ul>\n");
            }
        }
        out.push_str("</div>\n");
    }
}

impl PageShell for HtmlShell {
    fn render(&self, page: &DocsPage, user: Option<&str>) -> String {
        let mut out = String::with_capacity(16 * 1024);

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape_html(page.title));
        out.push_str("</head>\n<body>\n<header>\n<span>AI Proxy - API Docs</span>\n");
        if let Some(user) = user {
            let _ = writeln!(out, "<span class=\"user\">{}</span>", escape_html(user));
        }
        out.push_str("<a href=\"/dashboard\">Back to Dashboard</a>\n</header>\n<main>\n");

        let _ = writeln!(out, "<h1>{}</h1>", escape_html(page.title));
        out.push_str(
            "<p>This is a lightweight AI proxy providing access to language models and \
embeddings through an OpenAI-compatible API.</p>\n",
        );

        out.push_str("<section id=\"quick-start\">\n<h2>Quick Start</h2>\n");
        out.push_str(
            "<h3>1. Get Your API Key</h3>\n<p>Create an API key from your \
<a href=\"/dashboard\">dashboard</a>.</p>\n<h3>2. Make Your First Request</h3>\n",
        );
        if let Some(sample) = page.sample(TemplateId::QuickstartCurl) {
            Self::code_block(&mut out, sample);
        }
        out.push_str("</section>\n");

        out.push_str("<section id=\"authentication\">\n<h2>Authentication</h2>\n");
        out.push_str(
            "<p>All API requests require authentication using an API key in the \
Authorization header as a Bearer token:</p>\n",
        );
        let _ = writeln!(out, "<pre><code>{}</code></pre>", escape_html(page.auth_header));
        out.push_str("</section>\n");

        out.push_str("<section id=\"endpoints\">\n<h2>API Endpoints</h2>\n");
        for endpoint in page.endpoints {
            let method = match endpoint.method {
                HttpMethod::Get => "GET",
                HttpMethod::Post => "POST",
            };
            let _ = writeln!(out, "<div class=\"card endpoint\">\n<h3>{}</h3>", endpoint.title);
            let _ = writeln!(
                out,
                "<p><span class=\"method\">{}</span> <code>{}</code></p>",
                method, endpoint.path
            );
            let _ = writeln!(out, "<p>{}</p>", escape_html(endpoint.description));
            if let Some(shape) = endpoint.request_shape {
                let _ = writeln!(
                    out,
                    "<h4>Request Body</h4>\n<pre><code class=\"language-json\">{}</code></pre>",
                    escape_html(shape)
                );
            }
            for id in endpoint.samples {
                Self::sample_block(&mut out, page, *id);
            }
            out.push_str("</div>\n");
        }
        out.push_str("</section>\n");

        out.push_str("<section id=\"available-models\">\n<h2>Available Models</h2>\n");
        Self::allowlist_card(&mut out, &page.language_models);
        Self::allowlist_card(&mut out, &page.embedding_models);
        let _ = writeln!(
            out,
            "<p class=\"note\"><strong>Note:</strong> {}</p>",
            escape_html(page.fallback_note)
        );
        out.push_str("</section>\n");

        out.push_str("<section id=\"sdk-examples\">\n<h2>SDK Examples</h2>\n");
        for id in SDK_SAMPLES {
            Self::sample_block(&mut out, page, id);
        }
        out.push_str("</section>\n");

        out.push_str("<section id=\"notes\">\n<h2>Important Notes</h2>\n<ul>\n");
        for note in &page.notes {
            let _ = writeln!(
                out,
                "<li><strong>{}:</strong> {}</li>",
                escape_html(note.label),
                escape_html(&note.text)
            );
        }
        out.push_str("</ul>\n</section>\n");

        out.push_str("<section id=\"errors\">\n<h2>Error Handling</h2>\n");
        out.push_str(
            "<p>The API uses standard HTTP status codes to indicate success or failure:</p>\n",
        );
        for status in &page.status_codes {
            let _ = writeln!(
                out,
                "<div class=\"status\"><code>{} {}</code><p>{}</p></div>",
                status.code,
                status.reason,
                escape_html(&status.description)
            );
        }
        out.push_str("</section>\n");

        out.push_str(
            "<p>Need help? Check your <a href=\"/dashboard\">dashboard</a> for usage \
statistics and API keys.</p>\n</main>\n</body>\n</html>\n",
        );
        out
    }
}
