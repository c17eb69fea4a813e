//! Documentation page module.
//!
//! This module handles everything shown on the API docs page:
//! - Resolving example models from the configured allow-lists
//! - Rendering the request/response samples
//! - Assembling the page and handing it to a page shell

pub mod allowlist;
mod page;
pub mod reference;
mod shell;
pub mod templates;

pub use allowlist::{
    describe_allowlist, resolve_example, resolve_requested_model, AllowlistState, AllowlistView,
    ModelAllowlist, ModelCategory,
};
pub use page::{DocsPage, PageInputs};
pub use shell::{escape_html, HtmlShell, PageShell};
pub use templates::{render, ExampleContext, RenderedSample, TemplateId};
