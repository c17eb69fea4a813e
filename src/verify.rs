//! Drift check between the documented allow-lists and the live proxy.
//!
//! The page promises callers which models they can use. `verify` asks the
//! running proxy for its model list and reports allow-listed models the proxy
//! does not actually serve.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::docs::templates::{normalize_base_url, BASE_URL_PLACEHOLDER};
use crate::docs::{ModelAllowlist, ModelCategory};
use crate::error::{Error, Result};

/// Path of the proxy's model listing, relative to the base URL.
pub const MODELS_PATH: &str = "/proxy/v1/models";

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ListedModel>,
}

#[derive(Debug, Deserialize)]
struct ListedModel {
    id: String,
}

/// Outcome for one allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Every model is permitted, nothing to compare.
    Unrestricted,
    /// Every allow-listed model is served by the proxy.
    Consistent,
    /// Some allow-listed models are not served.
    Drift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCheck {
    pub category: ModelCategory,
    pub status: CheckStatus,
    /// Allow-listed models the proxy did not list, in allow-list order.
    pub missing: Vec<String>,
}

impl std::fmt::Display for CategoryCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            CheckStatus::Unrestricted => write!(f, "{} models: unrestricted, not checked", self.category),
            CheckStatus::Consistent => write!(f, "{} models: consistent", self.category),
            CheckStatus::Drift => write!(
                f,
                "{} models: DRIFT, not served by proxy: {}",
                self.category,
                self.missing.join(", ")
            ),
        }
    }
}

/// Compare one allow-list against the set of models the proxy serves.
pub fn compare(
    category: ModelCategory,
    allowlist: &ModelAllowlist,
    served: &HashSet<String>,
) -> CategoryCheck {
    let models = match allowlist {
        ModelAllowlist::Unrestricted => {
            return CategoryCheck {
                category,
                status: CheckStatus::Unrestricted,
                missing: Vec::new(),
            }
        }
        ModelAllowlist::Restricted(models) => models,
    };

    let missing: Vec<String> = models
        .iter()
        .filter(|m| !served.contains(*m))
        .cloned()
        .collect();

    let status = if missing.is_empty() {
        CheckStatus::Consistent
    } else {
        CheckStatus::Drift
    };

    CategoryCheck {
        category,
        status,
        missing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub models_url: String,
    pub served: usize,
    pub language: CategoryCheck,
    pub embedding: CategoryCheck,
}

impl DriftReport {
    pub fn is_consistent(&self) -> bool {
        self.language.status != CheckStatus::Drift && self.embedding.status != CheckStatus::Drift
    }
}

/// Fetch the model ids served by the proxy at `base_url`.
pub async fn fetch_served_models(
    client: &Client,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<Vec<String>> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), MODELS_PATH);

    let mut request = client.get(&url).header(header::ACCEPT, "application/json");
    if let Some(api_key) = api_key {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", api_key));
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!(error = %e, url = %url, "Failed to reach proxy");
        Error::Upstream(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, url = %url, body = %body, "Proxy returned error");
        return Err(Error::Verify(format!("{} returned {}: {}", url, status, body)));
    }

    let list: ModelList = response.json().await?;
    Ok(list.data.into_iter().map(|m| m.id).collect())
}

/// Compare the configured allow-lists with what the live proxy serves.
pub async fn verify(config: &Config) -> Result<DriftReport> {
    let base_url = normalize_base_url(config.server.base_url.as_deref().unwrap_or_default());
    if base_url == BASE_URL_PLACEHOLDER {
        return Err(Error::Verify(
            "server.base_url must be a valid http(s) URL to verify against the proxy".to_string(),
        ));
    }

    if config.verify.api_key.is_none() {
        tracing::warn!("No verify.api_key configured - the proxy may reject the request");
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.verify.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let api_key = config.verify.api_key.as_ref().map(|k| k.expose_secret());
    let served: HashSet<String> = fetch_served_models(&client, &base_url, api_key)
        .await?
        .into_iter()
        .collect();

    tracing::info!(served = served.len(), "Fetched models from proxy");

    Ok(DriftReport {
        models_url: format!("{}{}", base_url, MODELS_PATH),
        served: served.len(),
        language: compare(
            ModelCategory::Language,
            &config.models.language_allowlist(),
            &served,
        ),
        embedding: compare(
            ModelCategory::Embedding,
            &config.models.embedding_allowlist(),
            &served,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn served(models: &[&str]) -> HashSet<String> {
        models.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_compare_unrestricted_is_unchecked() {
        let check = compare(
            ModelCategory::Language,
            &ModelAllowlist::Unrestricted,
            &served(&[]),
        );
        assert_eq!(check.status, CheckStatus::Unrestricted);
        assert!(check.missing.is_empty());
    }

    #[test]
    fn test_compare_consistent() {
        let check = compare(
            ModelCategory::Language,
            &ModelAllowlist::restricted(["a", "b"]),
            &served(&["a", "b", "c"]),
        );
        assert_eq!(check.status, CheckStatus::Consistent);
    }

    #[test]
    fn test_compare_reports_missing_in_order() {
        let check = compare(
            ModelCategory::Embedding,
            &ModelAllowlist::restricted(["z", "a", "m"]),
            &served(&["a"]),
        );
        assert_eq!(check.status, CheckStatus::Drift);
        assert_eq!(check.missing, vec!["z".to_string(), "m".to_string()]);
        assert_eq!(
            check.to_string(),
            "embedding models: DRIFT, not served by proxy: z, m"
        );
    }

    #[test]
    fn test_compare_empty_allowlist_is_consistent() {
        let check = compare(
            ModelCategory::Language,
            &ModelAllowlist::Restricted(vec![]),
            &served(&["a"]),
        );
        assert_eq!(check.status, CheckStatus::Consistent);
    }

    #[tokio::test]
    async fn test_verify_requires_base_url() {
        let config = Config::parse_str("[server]").unwrap();
        let err = verify(&config).await.unwrap_err();
        assert!(matches!(err, Error::Verify(_)));
    }
}
