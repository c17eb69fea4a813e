//! Model allow-list resolution.
//!
//! The proxy restricts each request category (chat and embeddings) to an
//! operator-configured allow-list. The documentation page must agree with the
//! proxy about which models a caller can use, so the fallback rule the proxy
//! applies at request time lives here next to the display logic.

use serde::Serialize;

/// Example chat model used when no allow-listed model is available.
pub const DEFAULT_LANGUAGE_MODEL: &str = "gpt-4";

/// Example embedding model used when no allow-listed model is available.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Note shown under the "Available Models" section.
///
/// Must describe the same rule as [`resolve_requested_model`].
pub const FALLBACK_NOTE: &str = "If you request a model that is not in the allowed list, \
the API will automatically use the first allowed model from the respective category.";

/// Request category an allow-list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    Language,
    Embedding,
}

impl ModelCategory {
    /// Built-in example model for this category.
    pub fn builtin_default(self) -> &'static str {
        match self {
            ModelCategory::Language => DEFAULT_LANGUAGE_MODEL,
            ModelCategory::Embedding => DEFAULT_EMBEDDING_MODEL,
        }
    }

    /// Heading of the category's section on the page.
    pub fn title(self) -> &'static str {
        match self {
            ModelCategory::Language => "Language Models",
            ModelCategory::Embedding => "Embedding Models",
        }
    }
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelCategory::Language => write!(f, "language"),
            ModelCategory::Embedding => write!(f, "embedding"),
        }
    }
}

/// Models permitted for one request category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelAllowlist {
    /// Every model identifier is permitted.
    #[default]
    Unrestricted,
    /// Only the listed identifiers are permitted. The first entry is the
    /// fallback the proxy substitutes for unlisted requests.
    Restricted(Vec<String>),
}

impl ModelAllowlist {
    /// Build a restricted allow-list, dropping repeated identifiers.
    ///
    /// Order is preserved and the first occurrence of an identifier wins.
    pub fn restricted<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for model in models {
            let model = model.into();
            if unique.contains(&model) {
                tracing::debug!(model = %model, "Dropping duplicate allow-list entry");
                continue;
            }
            unique.push(model);
        }
        ModelAllowlist::Restricted(unique)
    }

    /// `None` means unrestricted; `Some(list)` is restricted to `list`.
    pub fn from_option(models: Option<Vec<String>>) -> Self {
        match models {
            None => ModelAllowlist::Unrestricted,
            Some(models) => ModelAllowlist::restricted(models),
        }
    }

    /// First allow-listed identifier, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            ModelAllowlist::Unrestricted => None,
            ModelAllowlist::Restricted(models) => models.first().map(String::as_str),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ModelAllowlist::Unrestricted)
    }

    /// Whether a request for `model` passes through unchanged.
    pub fn permits(&self, model: &str) -> bool {
        match self {
            ModelAllowlist::Unrestricted => true,
            ModelAllowlist::Restricted(models) => models.iter().any(|m| m == model),
        }
    }
}

/// Pick the model identifier embedded in example requests.
///
/// An empty restricted list still yields `builtin_default` so the samples stay
/// syntactically valid, even though the proxy would not serve that model.
pub fn resolve_example<'a>(allowlist: &'a ModelAllowlist, builtin_default: &'a str) -> &'a str {
    allowlist.first().unwrap_or(builtin_default)
}

/// Apply the proxy's request-time fallback rule.
///
/// - Unrestricted: the requested model passes through unchanged.
/// - Restricted and listed: passes through unchanged.
/// - Restricted and not listed: the first allow-listed model is used instead.
/// - Restricted and empty: no model can serve the request.
pub fn resolve_requested_model<'a>(
    allowlist: &'a ModelAllowlist,
    requested: &'a str,
) -> Option<&'a str> {
    if allowlist.permits(requested) {
        return Some(requested);
    }
    allowlist.first()
}

/// Which of the three mutually exclusive "Available Models" displays applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowlistState {
    /// All models available; no list is shown.
    Unrestricted,
    /// Restricted to nothing; no list is shown.
    Empty,
    /// Restricted to the listed items.
    Listed,
}

/// Display state plus the ordered items to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistDescription<'a> {
    pub state: AllowlistState,
    pub items: &'a [String],
}

pub fn describe_allowlist(allowlist: &ModelAllowlist) -> AllowlistDescription<'_> {
    match allowlist {
        ModelAllowlist::Unrestricted => AllowlistDescription {
            state: AllowlistState::Unrestricted,
            items: &[],
        },
        ModelAllowlist::Restricted(models) if models.is_empty() => AllowlistDescription {
            state: AllowlistState::Empty,
            items: &[],
        },
        ModelAllowlist::Restricted(models) => AllowlistDescription {
            state: AllowlistState::Listed,
            items: models,
        },
    }
}

/// The "Available Models" card for one category, ready for the page shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowlistView {
    pub category: ModelCategory,
    pub title: String,
    pub state: AllowlistState,
    /// Message shown instead of a list, for the unrestricted and empty states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub items: Vec<String>,
}

impl AllowlistView {
    pub fn new(category: ModelCategory, allowlist: &ModelAllowlist) -> Self {
        let description = describe_allowlist(allowlist);
        let message = match description.state {
            AllowlistState::Unrestricted => {
                Some(format!("All {} models are available.", category))
            }
            AllowlistState::Empty => Some(format!(
                "No {} models are currently configured.",
                category
            )),
            AllowlistState::Listed => None,
        };

        Self {
            category,
            title: category.title().to_string(),
            state: description.state,
            message,
            items: description.items.to_vec(),
        }
    }
}
