//! Configuration parsing and validation for aiproxy-docs.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use crate::docs::{ModelAllowlist, PageInputs};

/// Convention env var consulted when `server.base_url` is absent.
pub const BASE_URL_ENV: &str = "AIPROXY_BASE_URL";

/// Convention env var consulted when `verify.api_key` is absent.
pub const API_KEY_ENV: &str = "AIPROXY_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Public URL of the proxy, used in every example request
    pub base_url: Option<String>,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// Model allow-lists. An absent list means every model is permitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsConfig {
    #[serde(default, deserialize_with = "deserialize_model_list")]
    pub allowed_language_models: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_model_list")]
    pub allowed_embedding_models: Option<Vec<String>>,
}

impl ModelsConfig {
    pub fn language_allowlist(&self) -> ModelAllowlist {
        ModelAllowlist::from_option(self.allowed_language_models.clone())
    }

    pub fn embedding_allowlist(&self) -> ModelAllowlist {
        ModelAllowlist::from_option(self.allowed_embedding_models.clone())
    }
}

/// An allow-list entry as written in the config file.
///
/// Anything that is not a string is kept as its TOML text rather than
/// rejecting the whole list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelEntry {
    Text(String),
    Other(toml::Value),
}

impl From<ModelEntry> for String {
    fn from(entry: ModelEntry) -> Self {
        match entry {
            ModelEntry::Text(model) => model,
            ModelEntry::Other(value) => {
                let model = value.to_string();
                tracing::warn!(entry = %model, "Non-string allow-list entry, using its text");
                model
            }
        }
    }
}

fn deserialize_model_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<ModelEntry>> = Option::deserialize(deserializer)?;
    Ok(entries.map(|entries| entries.into_iter().map(String::from).collect()))
}

/// Settings for `verify`, which checks the docs against the live proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyConfig {
    /// API key used to call the live proxy
    pub api_key: Option<ApiKey>,
    /// Request timeout in seconds
    #[serde(default = "default_verify_timeout")]
    pub timeout_secs: u64,
}

fn default_verify_timeout() -> u64 {
    120
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_verify_timeout(),
        }
    }
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
///
/// Only accessible via `.expose_secret()`, so every use is grep-auditable.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> serde::Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ApiKey(SecretString::from(s)))
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How a configuration value was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Literal string in config (no ${} references)
    Literal,
    /// Contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Taken from a convention env var (holds var name)
    Convention(String),
    /// No value available
    None,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Literal => write!(f, "config-literal"),
            ValueSource::EnvExpanded => write!(f, "env-expanded"),
            ValueSource::Convention(var) => write!(f, "convention ({})", var),
            ValueSource::None => write!(f, "none"),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Only an unusable listen address is an error. Problems that merely
    /// degrade the rendered page are logged.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.listen must not be empty".to_string(),
            ));
        }

        match self.server.base_url.as_deref().map(str::trim) {
            None | Some("") => {
                tracing::warn!("No base_url configured - examples will use a placeholder URL");
            }
            Some(base_url) => match url::Url::parse(base_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
                Ok(parsed) => {
                    tracing::warn!(
                        base_url = %base_url,
                        scheme = %parsed.scheme(),
                        "base_url is not an http(s) URL - examples will use a placeholder URL"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        base_url = %base_url,
                        error = %e,
                        "base_url is not a valid URL - examples will use a placeholder URL"
                    );
                }
            },
        }

        for (field, models) in [
            ("allowed_language_models", &self.models.allowed_language_models),
            ("allowed_embedding_models", &self.models.allowed_embedding_models),
        ] {
            let Some(models) = models else { continue };
            if models.is_empty() {
                tracing::warn!(field, "Allow-list is empty - no models of this category can be used");
            }
            for (i, model) in models.iter().enumerate() {
                if models[..i].contains(model) {
                    tracing::warn!(field, model = %model, "Duplicate allow-list entry ignored");
                }
            }
        }

        Ok(())
    }

    /// Inputs for rendering the documentation page.
    pub fn page_inputs(&self) -> PageInputs {
        PageInputs {
            base_url: self.server.base_url.clone().unwrap_or_default(),
            language_models: self.models.language_allowlist(),
            embedding_models: self.models.embedding_allowlist(),
        }
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' not set for '{field}': {message}")]
    EnvVar {
        var: String,
        field: String,
        message: String,
    },
}

/// Raw server config; `base_url` may contain `${VAR}` references.
#[derive(Deserialize)]
pub struct RawServerConfig {
    #[serde(default = "default_listen")]
    listen: String,
    base_url: Option<String>,
}

/// Raw verify config; `api_key` may contain `${VAR}` references.
#[derive(Deserialize)]
pub struct RawVerifyConfig {
    api_key: Option<String>,
    #[serde(default = "default_verify_timeout")]
    timeout_secs: u64,
}

impl Default for RawVerifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_verify_timeout(),
        }
    }
}

/// Raw configuration deserialized directly from TOML, before env expansion.
#[derive(Deserialize)]
pub struct RawConfig {
    server: RawServerConfig,
    #[serde(default)]
    models: ModelsConfig,
    #[serde(default)]
    verify: RawVerifyConfig,
}

/// Expand all `${VAR}` references in a string using a custom lookup function.
///
/// Supports multiple `${VAR}` in one string (e.g., `${SCHEME}://${HOST}`).
/// Fails on first missing variable, unclosed `${`, or empty variable name.
fn expand_env_vars_with<F>(input: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after.find('}').ok_or_else(|| ConfigError::EnvVar {
            var: "<unclosed>".to_string(),
            field: field.to_string(),
            message: format!("Unclosed '${{' in config value: {}", input),
        })?;

        let var_name = &after[..end];
        if var_name.is_empty() {
            return Err(ConfigError::EnvVar {
                var: "".to_string(),
                field: field.to_string(),
                message: "Empty variable name in '${}' reference".to_string(),
            });
        }

        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVar {
            var: var_name.to_string(),
            field: field.to_string(),
            message: format!(
                "Environment variable '{}' is not set (referenced in '{}')",
                var_name, field
            ),
        })?;

        result.push_str(&value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Resolve one optional config value: expand `${VAR}` references, or fall
/// back to the convention env var when the value is absent.
fn resolve_value_with<F>(
    raw: Option<String>,
    field: &str,
    convention_var: &str,
    lookup: F,
) -> Result<(Option<String>, ValueSource), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match raw {
        Some(raw) if raw.contains("${") => {
            let expanded = expand_env_vars_with(&raw, field, &lookup)?;
            Ok((Some(expanded), ValueSource::EnvExpanded))
        }
        Some(raw) => Ok((Some(raw), ValueSource::Literal)),
        None => match lookup(convention_var) {
            Some(value) => Ok((Some(value), ValueSource::Convention(convention_var.to_string()))),
            None => Ok((None, ValueSource::None)),
        },
    }
}

impl Config {
    /// Convert raw (deserialized) config to final config with env var expansion.
    ///
    /// Returns the config and the source of each env-aware field
    /// (`server.base_url`, `verify.api_key`).
    pub fn from_raw(raw: RawConfig) -> Result<(Self, Vec<(String, ValueSource)>), ConfigError> {
        Self::from_raw_with(raw, |name| std::env::var(name).ok())
    }

    fn from_raw_with<F>(
        raw: RawConfig,
        lookup: F,
    ) -> Result<(Self, Vec<(String, ValueSource)>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (base_url, base_url_source) =
            resolve_value_with(raw.server.base_url, "server.base_url", BASE_URL_ENV, &lookup)?;
        let (api_key, api_key_source) =
            resolve_value_with(raw.verify.api_key, "verify.api_key", API_KEY_ENV, &lookup)?;

        let config = Config {
            server: ServerConfig {
                listen: raw.server.listen,
                base_url,
            },
            models: raw.models,
            verify: VerifyConfig {
                api_key: api_key.map(ApiKey::from),
                timeout_secs: raw.verify.timeout_secs,
            },
        };

        let sources = vec![
            ("server.base_url".to_string(), base_url_source),
            ("verify.api_key".to_string(), api_key_source),
        ];

        Ok((config, sources))
    }

    /// Load configuration from a TOML file with environment variable expansion.
    ///
    /// This is the env-var-aware entry point. It:
    /// 1. Reads the file
    /// 2. Parses as `RawConfig`
    /// 3. Expands `${VAR}` references and applies convention lookup
    /// 4. Validates the resulting config
    pub fn from_file_with_env(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Vec<(String, ValueSource)>), ConfigError> {
        let content = read_config(path.as_ref())?;

        let raw: RawConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
        let (config, sources) = Self::from_raw(raw)?;
        config.validate()?;

        Ok((config, sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [server]
            listen = "127.0.0.1:9000"
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert!(config.server.base_url.is_none());
        assert!(config.models.language_allowlist().is_unrestricted());
        assert!(config.models.embedding_allowlist().is_unrestricted());
        assert_eq!(config.verify.timeout_secs, 120);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            listen = "0.0.0.0:8080"
            base_url = "https://ai.example.org"

            [models]
            allowed_language_models = ["claude-3-opus", "claude-3-haiku"]
            allowed_embedding_models = []

            [verify]
            api_key = "sk-test"
            timeout_secs = 5
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(config.server.base_url.as_deref(), Some("https://ai.example.org"));
        assert_eq!(
            config.models.language_allowlist(),
            ModelAllowlist::Restricted(vec!["claude-3-opus".into(), "claude-3-haiku".into()])
        );
        assert_eq!(
            config.models.embedding_allowlist(),
            ModelAllowlist::Restricted(vec![])
        );
        assert_eq!(config.verify.timeout_secs, 5);
    }

    #[test]
    fn test_non_string_entries_kept_as_text() {
        let toml = r#"
            [server]

            [models]
            allowed_language_models = ["gpt-4o", 42, true, 1.5]
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(
            config.models.allowed_language_models,
            Some(vec![
                "gpt-4o".to_string(),
                "42".to_string(),
                "true".to_string(),
                "1.5".to_string()
            ])
        );
    }

    #[test]
    fn test_duplicate_entries_collapse_in_allowlist() {
        let toml = r#"
            [server]

            [models]
            allowed_language_models = ["a", "b", "a"]
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(
            config.models.language_allowlist(),
            ModelAllowlist::Restricted(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_empty_listen_rejected() {
        let toml = r#"
            [server]
            listen = ""
        "#;

        let err = Config::parse_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_base_url_is_not_fatal() {
        let toml = r#"
            [server]
            base_url = "not a url"
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(config.page_inputs().base_url, "not a url");
    }

    #[test]
    #[traced_test]
    fn test_non_http_base_url_warns_at_load() {
        let toml = r#"
            [server]
            base_url = "ftp://files.example.org"
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(config.page_inputs().base_url, "ftp://files.example.org");
        assert!(logs_contain("base_url is not an http(s) URL"));
    }

    #[test]
    fn test_page_inputs_without_base_url() {
        let config = Config::parse_str("[server]").unwrap();
        let inputs = config.page_inputs();
        assert_eq!(inputs.base_url, "");
        assert!(inputs.language_models.is_unrestricted());
    }

    #[test]
    fn test_api_key_debug_redaction() {
        let key = ApiKey::from("sk-super-secret");
        let debug_output = format!("{:?}", key);
        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("super-secret"));
    }

    #[test]
    fn test_api_key_display_redaction() {
        let key = ApiKey::from("sk-super-secret");
        assert_eq!(format!("{}", key), "[REDACTED]");
    }

    #[test]
    fn test_api_key_serialize_redaction() {
        let key = ApiKey::from("real-secret-value");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");
    }

    #[test]
    fn test_verify_config_debug_redaction() {
        let toml = r#"
            [server]

            [verify]
            api_key = "sk-ABCD1234secret"
        "#;

        let config = Config::parse_str(toml).unwrap();
        assert_eq!(
            config.verify.api_key.as_ref().unwrap().expose_secret(),
            "sk-ABCD1234secret"
        );
        let debug = format!("{:?}", config.verify);
        assert!(!debug.contains("sk-ABCD1234secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    // ── Expansion tests (using expand_env_vars_with, no global env state) ──

    #[test]
    fn test_expand_single_var() {
        let lookup = |name: &str| match name {
            "PUBLIC_URL" => Some("https://ai.example.org".to_string()),
            _ => None,
        };
        let result = expand_env_vars_with("${PUBLIC_URL}", "server.base_url", lookup).unwrap();
        assert_eq!(result, "https://ai.example.org");
    }

    #[test]
    fn test_expand_multiple_vars() {
        let lookup = |name: &str| match name {
            "SCHEME" => Some("https".to_string()),
            "HOST" => Some("example.com".to_string()),
            _ => None,
        };
        let result = expand_env_vars_with("${SCHEME}://${HOST}", "test", lookup).unwrap();
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn test_expand_no_vars_passthrough() {
        let lookup = |_: &str| -> Option<String> { panic!("should not be called") };
        let result = expand_env_vars_with("literal-value", "test", lookup).unwrap();
        assert_eq!(result, "literal-value");
    }

    #[test]
    fn test_expand_missing_var_fails() {
        let lookup = |_: &str| None;
        let err = expand_env_vars_with("${MISSING}", "server.base_url", lookup)
            .unwrap_err()
            .to_string();
        assert!(err.contains("MISSING"), "Error should name the variable");
        assert!(err.contains("server.base_url"), "Error should name the field");
    }

    #[test]
    fn test_expand_unclosed_brace_fails() {
        let lookup = |_: &str| -> Option<String> { panic!("should not be called") };
        let err = expand_env_vars_with("${UNCLOSED", "test", lookup)
            .unwrap_err()
            .to_string()
            .to_lowercase();
        assert!(err.contains("unclosed"));
    }

    #[test]
    fn test_expand_empty_var_name_fails() {
        let lookup = |_: &str| -> Option<String> { panic!("should not be called") };
        let err = expand_env_vars_with("${}", "test", lookup)
            .unwrap_err()
            .to_string()
            .to_lowercase();
        assert!(err.contains("empty"));
    }

    #[test]
    fn test_expand_dollar_without_brace_passthrough() {
        let lookup = |_: &str| -> Option<String> { panic!("should not be called") };
        let result = expand_env_vars_with("$NOT_A_VAR", "test", lookup).unwrap();
        assert_eq!(result, "$NOT_A_VAR");
    }

    // ── from_raw tests ──

    fn make_raw_config(base_url: Option<&str>, api_key: Option<&str>) -> RawConfig {
        RawConfig {
            server: RawServerConfig {
                listen: "127.0.0.1:9000".to_string(),
                base_url: base_url.map(String::from),
            },
            models: ModelsConfig::default(),
            verify: RawVerifyConfig {
                api_key: api_key.map(String::from),
                ..RawVerifyConfig::default()
            },
        }
    }

    #[test]
    fn test_from_raw_literal_values() {
        let raw = make_raw_config(Some("https://ai.example.org"), Some("sk-literal"));
        let (config, sources) = Config::from_raw_with(raw, |_| None).unwrap();

        assert_eq!(sources[0], ("server.base_url".to_string(), ValueSource::Literal));
        assert_eq!(sources[1], ("verify.api_key".to_string(), ValueSource::Literal));
        assert_eq!(config.server.base_url.as_deref(), Some("https://ai.example.org"));
        assert_eq!(config.verify.api_key.unwrap().expose_secret(), "sk-literal");
    }

    #[test]
    fn test_from_raw_env_expanded() {
        let lookup = |name: &str| match name {
            "HOST" => Some("ai.example.org".to_string()),
            "KEY" => Some("sk-from-env".to_string()),
            _ => None,
        };
        let raw = make_raw_config(Some("https://${HOST}"), Some("${KEY}"));
        let (config, sources) = Config::from_raw_with(raw, lookup).unwrap();

        assert_eq!(sources[0].1, ValueSource::EnvExpanded);
        assert_eq!(sources[1].1, ValueSource::EnvExpanded);
        assert_eq!(config.server.base_url.as_deref(), Some("https://ai.example.org"));
        assert_eq!(config.verify.api_key.unwrap().expose_secret(), "sk-from-env");
    }

    #[test]
    fn test_from_raw_convention() {
        let lookup = |name: &str| match name {
            BASE_URL_ENV => Some("https://conv.example.org".to_string()),
            _ => None,
        };
        let raw = make_raw_config(None, None);
        let (config, sources) = Config::from_raw_with(raw, lookup).unwrap();

        assert_eq!(sources[0].1, ValueSource::Convention(BASE_URL_ENV.to_string()));
        assert_eq!(sources[1].1, ValueSource::None);
        assert_eq!(config.server.base_url.as_deref(), Some("https://conv.example.org"));
        assert!(config.verify.api_key.is_none());
    }

    #[test]
    fn test_from_raw_missing_env_var_fails() {
        let raw = make_raw_config(Some("${NOPE}"), None);
        let err = Config::from_raw_with(raw, |_| None).unwrap_err().to_string();
        assert!(err.contains("NOPE"), "Error should name the variable: {}", err);
        assert!(err.contains("server.base_url"), "Error should name the field: {}", err);
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::Literal.to_string(), "config-literal");
        assert_eq!(
            ValueSource::Convention(API_KEY_ENV.to_string()).to_string(),
            "convention (AIPROXY_API_KEY)"
        );
    }
}
